//! Pixel shaders for triangle rasterization.
//!
//! The rasterizer handles coverage, barycentric weights and depth; the shader
//! only turns the (perspective-corrected) weights into a colour.

use crate::math::vec3::Vec3;

/// Trait for per-sample colour computations.
///
/// The `lambda` parameter contains three weights [λ₀, λ₁, λ₂] that sum to 1.0
/// and have already been corrected for perspective, so any per-vertex
/// attribute is `λ₀*attr₀ + λ₁*attr₁ + λ₂*attr₂`.
pub trait PixelShader {
    fn shade(&self, lambda: [f32; 3]) -> Vec3;
}

/// Flat shader - returns a constant color for all samples.
pub struct FlatShader {
    color: Vec3,
}

impl FlatShader {
    pub fn new(color: Vec3) -> Self {
        Self { color }
    }
}

impl PixelShader for FlatShader {
    #[inline]
    fn shade(&self, _lambda: [f32; 3]) -> Vec3 {
        self.color
    }
}

/// Gouraud shader - interpolates vertex colors using barycentric coordinates.
pub struct GouraudShader {
    colors: [Vec3; 3],
}

impl GouraudShader {
    pub fn new(vertex_colors: [Vec3; 3]) -> Self {
        Self {
            colors: vertex_colors,
        }
    }
}

impl PixelShader for GouraudShader {
    #[inline]
    fn shade(&self, lambda: [f32; 3]) -> Vec3 {
        Vec3::weighted(self.colors, lambda)
    }
}
