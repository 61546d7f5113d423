//! Triangle scan conversion.
//!
//! [`EdgeFunctionRasterizer`] walks a triangle's bounding box, tests each
//! sample with edge functions, interpolates depth and colour with
//! perspective-correct barycentric weights and hands the result to the
//! framebuffer's depth test. The same routine serves direct rendering (one
//! sample per pixel) and 2x2 supersampling; the [`FrameState`] decides where
//! samples sit and where they are stored.
//!
//! [`FrameState`]: super::framebuffer::FrameState

mod edgefunction;
mod shader;

pub use edgefunction::{barycentric, edge_function, inside_triangle, EdgeFunctionRasterizer};
pub use shader::{FlatShader, GouraudShader, PixelShader};

use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;

/// A triangle ready for rasterization in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// x, y in pixels (y up), z in depth-buffer units, w the clip-space w.
    pub vertices: [Vec4; 3],
    /// Per-vertex RGB colours, 0..=255.
    pub colors: [Vec3; 3],
}

impl Triangle {
    pub fn new(vertices: [Vec4; 3], colors: [Vec3; 3]) -> Self {
        Self { vertices, colors }
    }

    /// A single-coloured triangle with `w = 1` at every vertex.
    pub fn flat(points: [Vec3; 3], color: Vec3) -> Self {
        Self::new(points.map(|p| Vec4::from_vec3(p, 1.0)), [color; 3])
    }

    /// The colour flat shading paints the whole face with.
    pub fn face_color(&self) -> Vec3 {
        self.colors[0]
    }
}

/// How colour is derived inside a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Whole face takes the first vertex's colour.
    #[default]
    Flat,
    /// Perspective-correct blend of the three vertex colours.
    Gouraud,
}

impl std::fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShadingMode::Flat => write!(f, "Flat"),
            ShadingMode::Gouraud => write!(f, "Gouraud"),
        }
    }
}
