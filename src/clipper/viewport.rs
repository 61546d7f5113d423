//! Perspective divide and viewport mapping.

use crate::math::vec4::Vec4;
use crate::projection::DepthRange;

/// Maps clip-space positions to pixel coordinates and depth-buffer units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    depth_range: DepthRange,
}

impl Viewport {
    pub fn new(width: u32, height: u32, depth_range: DepthRange) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            depth_range,
        }
    }

    /// Divide by `w` and map into screen space.
    ///
    /// Returns `(x', y', z', w)`: `x'` and `y'` in pixels with `y` pointing up,
    /// `z'` remapped through the depth range, and the original clip-space `w`
    /// kept for perspective-correct interpolation. The caller guarantees
    /// `w > 0` (see [`super::clip_space`]).
    #[inline]
    pub fn to_screen(&self, clip: Vec4) -> Vec4 {
        let ndc = clip.to_vec3() * (1.0 / clip.w);
        Vec4::new(
            0.5 * self.width * (ndc.x + 1.0),
            0.5 * self.height * (ndc.y + 1.0),
            self.depth_range.remap(ndc.z),
            clip.w,
        )
    }
}
