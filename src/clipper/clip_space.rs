//! Clip-space clipping against the camera plane.
//!
//! Clipping occurs after projection (in homogeneous clip space), before the
//! perspective divide. Only one plane is used:
//!
//! ```text
//! w >= W_EPSILON
//! ```
//!
//! Vertices with `w <= 0` sit on or behind the camera; dividing by their `w`
//! mirrors them across the screen. Triangles that straddle the plane are cut
//! down to the visible part and fan-triangulated again, which yields zero, one
//! or two triangles. Geometry that is merely off-screen is left alone; the
//! scan converter clamps its bounding box to the framebuffer.

use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;

/// Smallest clip-space `w` a vertex may keep.
pub const W_EPSILON: f32 = 1e-5;

/// A vertex in homogeneous clip space with its colour attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipSpaceVertex {
    /// Position in clip space (x, y, z, w), before the perspective divide
    pub position: Vec4,
    /// RGB colour, 0..=255
    pub color: Vec3,
}

impl ClipSpaceVertex {
    pub fn new(position: Vec4, color: Vec3) -> Self {
        Self { position, color }
    }

    /// Linearly interpolate all attributes between two vertices.
    /// Used when a polygon edge crosses the clipping plane.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            color: self.color + (other.color - self.color) * t,
        }
    }

    /// Signed distance to the clipping plane. Positive = kept.
    #[inline]
    fn signed_distance(&self) -> f32 {
        self.position.w - W_EPSILON
    }

    #[inline]
    pub fn is_inside(&self) -> bool {
        self.signed_distance() >= 0.0
    }
}

/// A polygon in clip space, represented as a list of vertices.
///
/// Used as an intermediate representation during clipping. After clipping
/// this is triangulated back into triangles for rasterization.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipSpacePolygon {
    pub vertices: Vec<ClipSpaceVertex>,
}

impl ClipSpacePolygon {
    /// Create a polygon from a triangle (3 vertices).
    pub fn from_triangle(v0: ClipSpaceVertex, v1: ClipSpaceVertex, v2: ClipSpaceVertex) -> Self {
        Self {
            vertices: vec![v0, v1, v2],
        }
    }

    /// Returns true if the polygon has been completely clipped away.
    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Clip against `w >= W_EPSILON` using the Sutherland-Hodgman algorithm.
    pub fn clip(&self) -> Self {
        if self.is_empty() {
            return Self { vertices: vec![] };
        }

        let mut output = Vec::with_capacity(self.vertices.len() + 1);

        for i in 0..self.vertices.len() {
            let current = &self.vertices[i];
            let next = &self.vertices[(i + 1) % self.vertices.len()];

            let d1 = current.signed_distance();
            let d2 = next.signed_distance();

            if d1 >= 0.0 {
                output.push(*current);
                if d2 < 0.0 {
                    // Leaving the visible half-space
                    output.push(current.lerp(next, d1 / (d1 - d2)));
                }
            } else if d2 >= 0.0 {
                // Entering the visible half-space
                output.push(current.lerp(next, d1 / (d1 - d2)));
            }
        }

        Self { vertices: output }
    }

    /// Triangulate this convex polygon using fan triangulation.
    pub fn triangulate(&self) -> impl Iterator<Item = [ClipSpaceVertex; 3]> + '_ {
        (1..self.vertices.len().saturating_sub(1))
            .map(move |i| [self.vertices[0], self.vertices[i], self.vertices[i + 1]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex(x: f32, w: f32) -> ClipSpaceVertex {
        ClipSpaceVertex::new(Vec4::new(x, 0.0, 0.0, w), Vec3::splat(w))
    }

    #[test]
    fn fully_visible_triangle_is_untouched() {
        let poly =
            ClipSpacePolygon::from_triangle(vertex(0.0, 1.0), vertex(1.0, 2.0), vertex(2.0, 3.0));
        let clipped = poly.clip();
        assert_eq!(clipped, poly);
        assert_eq!(clipped.triangulate().count(), 1);
    }

    #[test]
    fn triangle_behind_camera_is_removed() {
        let poly =
            ClipSpacePolygon::from_triangle(vertex(0.0, -1.0), vertex(1.0, -2.0), vertex(2.0, 0.0));
        let clipped = poly.clip();
        assert!(clipped.is_empty());
        assert_eq!(clipped.triangulate().count(), 0);
    }

    #[test]
    fn one_vertex_behind_yields_a_quad() {
        let poly =
            ClipSpacePolygon::from_triangle(vertex(0.0, 1.0), vertex(1.0, 1.0), vertex(2.0, -1.0));
        let clipped = poly.clip();
        assert_eq!(clipped.vertices.len(), 4);
        assert_eq!(clipped.triangulate().count(), 2);
        for v in &clipped.vertices {
            assert!(v.position.w >= W_EPSILON * 0.999);
        }
    }

    #[test]
    fn two_vertices_behind_yields_a_triangle() {
        let poly =
            ClipSpacePolygon::from_triangle(vertex(0.0, 2.0), vertex(1.0, -1.0), vertex(2.0, -1.0));
        let clipped = poly.clip();
        assert_eq!(clipped.vertices.len(), 3);
        for v in &clipped.vertices {
            assert!(v.position.w >= W_EPSILON * 0.999);
        }
    }

    #[test]
    fn intersection_interpolates_color() {
        let a = ClipSpaceVertex::new(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec3::splat(0.0));
        let b = ClipSpaceVertex::new(Vec4::new(0.0, 0.0, 0.0, -1.0), Vec3::splat(200.0));
        let mid = a.lerp(&b, 0.5);
        assert_relative_eq!(mid.color.x, 100.0);
        assert_relative_eq!(mid.position.w, 0.0);
    }
}
