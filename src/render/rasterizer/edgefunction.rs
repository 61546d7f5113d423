//! Edge function-based triangle rasterization.
//!
//! # Algorithm Overview
//!
//! 1. Compute the triangle's bounding box, clamped to the framebuffer
//! 2. For each pixel in the box, visit its sample positions (one in direct
//!    mode, four in SSAA mode)
//! 3. A sample is inside the triangle if all three edge functions share a sign
//! 4. Inside samples get perspective-correct depth and colour and go through
//!    the depth test
//!
//! # Edge Function
//!
//! For an edge from point A to point B, the edge function at point P is:
//!
//! ```text
//! E(P) = (P.x - A.x) * (B.y - A.y) - (P.y - A.y) * (B.x - A.x)
//! ```
//!
//! This is the 2D cross product of (B - A) and (P - A), negated. Its sign tells
//! which side of AB the point lies on and zero means P is on the edge.
//!
//! # Fill Rule
//!
//! Edges are inclusive: a sample with one edge function exactly zero counts as
//! inside, whatever the winding. Two triangles sharing an edge therefore both
//! cover samples on it, and the strict depth test keeps whichever was drawn
//! first.
//!
//! # Perspective Correction
//!
//! Barycentric weights computed in screen space are not affine in view space.
//! With per-vertex clip-space `w`, the corrected weights are
//!
//! ```text
//! w_rec = 1 / (λ₀/w₀ + λ₁/w₁ + λ₂/w₂)
//! λ'ᵢ   = w_rec * λᵢ / wᵢ
//! z     = λ'₀ z₀ + λ'₁ z₁ + λ'₂ z₂
//! ```
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)
//! - Scratchapixel: <https://www.scratchapixel.com/lessons/3d-basic-rendering/rasterization-practical-implementation>

use super::shader::{FlatShader, GouraudShader, PixelShader};
use super::{ShadingMode, Triangle};
use crate::math::vec4::Vec4;
use crate::render::framebuffer::FrameState;

/// Computes the edge function value for point (px, py) relative to edge (A -> B).
#[inline]
pub fn edge_function(a: Vec4, b: Vec4, px: f32, py: f32) -> f32 {
    (px - a.x) * (b.y - a.y) - (py - a.y) * (b.x - a.x)
}

/// The three edge functions of one screen-space triangle plus its signed area.
///
/// Built once per triangle; both the scan loop and the free-standing point
/// queries go through it.
#[derive(Debug, Clone, Copy)]
struct EdgeEquations {
    v: [Vec4; 3],
    area: f32,
    inv_area: f32,
}

impl EdgeEquations {
    /// `None` for zero-area triangles.
    #[inline]
    fn new(v: &[Vec4; 3]) -> Option<Self> {
        let area = edge_function(v[0], v[1], v[2].x, v[2].y);
        if area.abs() < f32::EPSILON {
            return None;
        }
        Some(Self {
            v: *v,
            area,
            inv_area: 1.0 / area,
        })
    }

    /// Edge values at (x, y), each opposite the vertex of the same index.
    #[inline]
    fn eval(&self, x: f32, y: f32) -> [f32; 3] {
        let v = &self.v;
        [
            edge_function(v[1], v[2], x, y),
            edge_function(v[2], v[0], x, y),
            edge_function(v[0], v[1], x, y),
        ]
    }

    /// Inclusive coverage: every edge value has the area's sign or is zero.
    #[inline]
    fn covers(&self, e: [f32; 3]) -> bool {
        if self.area > 0.0 {
            e[0] >= 0.0 && e[1] >= 0.0 && e[2] >= 0.0
        } else {
            e[0] <= 0.0 && e[1] <= 0.0 && e[2] <= 0.0
        }
    }

    #[inline]
    fn weights(&self, e: [f32; 3]) -> [f32; 3] {
        [e[0] * self.inv_area, e[1] * self.inv_area, e[2] * self.inv_area]
    }
}

/// Whether (x, y) lies inside the screen-space triangle `v`, edges included.
///
/// Degenerate triangles contain nothing.
pub fn inside_triangle(x: f32, y: f32, v: &[Vec4; 3]) -> bool {
    EdgeEquations::new(v).is_some_and(|eq| eq.covers(eq.eval(x, y)))
}

/// Screen-space barycentric coordinates (α, β, γ) of (x, y).
///
/// Each weight is the signed area of the sub-triangle opposite a vertex over
/// the full signed area. Returns `None` for zero-area triangles.
pub fn barycentric(x: f32, y: f32, v: &[Vec4; 3]) -> Option<[f32; 3]> {
    EdgeEquations::new(v).map(|eq| eq.weights(eq.eval(x, y)))
}

/// Triangle rasterizer using the edge function algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeFunctionRasterizer {
    shading: ShadingMode,
}

impl EdgeFunctionRasterizer {
    pub fn new(shading: ShadingMode) -> Self {
        Self { shading }
    }

    pub fn shading(&self) -> ShadingMode {
        self.shading
    }

    pub fn set_shading(&mut self, shading: ShadingMode) {
        self.shading = shading;
    }

    /// Scan-convert one triangle into `frame`.
    ///
    /// Returns the number of samples that passed the depth test, or `None` if
    /// the triangle was skipped as degenerate (zero area or non-finite
    /// coordinates).
    pub fn fill_triangle(&self, triangle: &Triangle, frame: &mut FrameState) -> Option<usize> {
        match self.shading {
            ShadingMode::Flat => {
                let shader = FlatShader::new(triangle.face_color());
                Self::rasterize_with_shader(triangle, frame, &shader)
            }
            ShadingMode::Gouraud => {
                let shader = GouraudShader::new(triangle.colors);
                Self::rasterize_with_shader(triangle, frame, &shader)
            }
        }
    }

    fn rasterize_with_shader<S: PixelShader>(
        triangle: &Triangle,
        frame: &mut FrameState,
        shader: &S,
    ) -> Option<usize> {
        let v = &triangle.vertices;
        if !v.iter().all(Vec4::is_finite) || v.iter().any(|p| p.w == 0.0) {
            return None;
        }

        // ─────────────────────────────────────────────────────────────────────
        // Step 1: Signed area (2x triangle area)
        // ─────────────────────────────────────────────────────────────────────
        let edges = EdgeEquations::new(v)?;
        let inv_w = [1.0 / v[0].w, 1.0 / v[1].w, 1.0 / v[2].w];

        // ─────────────────────────────────────────────────────────────────────
        // Step 2: Bounding box, clipped to framebuffer bounds
        // ─────────────────────────────────────────────────────────────────────
        let min_x = (v[0].x.min(v[1].x).min(v[2].x).floor() as i64).max(0);
        let max_x = (v[0].x.max(v[1].x).max(v[2].x).ceil() as i64).min(frame.width() as i64 - 1);
        let min_y = (v[0].y.min(v[1].y).min(v[2].y).floor() as i64).max(0);
        let max_y =
            (v[0].y.max(v[1].y).max(v[2].y).ceil() as i64).min(frame.height() as i64 - 1);

        let scale = frame.samples_per_axis() as f32;
        let offsets = frame.sample_offsets();
        let mut written = 0;

        // ─────────────────────────────────────────────────────────────────────
        // Step 3: Test every sample of every pixel in the box
        // ─────────────────────────────────────────────────────────────────────
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                for &(ox, oy) in offsets {
                    let px = x as f32 + ox;
                    let py = y as f32 + oy;

                    let e = edges.eval(px, py);
                    if !edges.covers(e) {
                        continue;
                    }

                    let lambda = edges.weights(e);
                    let w_rec = 1.0
                        / (lambda[0] * inv_w[0] + lambda[1] * inv_w[1] + lambda[2] * inv_w[2]);
                    let corrected = [
                        lambda[0] * inv_w[0] * w_rec,
                        lambda[1] * inv_w[1] * w_rec,
                        lambda[2] * inv_w[2] * w_rec,
                    ];
                    let z = corrected[0] * v[0].z + corrected[1] * v[1].z + corrected[2] * v[2].z;

                    let sx = (px * scale).floor() as usize;
                    let sy = (py * scale).floor() as usize;
                    if frame.write_sample(sx, sy, -z, shader.shade(corrected)) {
                        written += 1;
                    }
                }
            }
        }

        Some(written)
    }
}
