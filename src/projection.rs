//! Perspective projection parameters.
//!
//! The [`Projection`] struct is the single source of truth for the perspective
//! parameters (FOV, aspect ratio, near/far planes). It generates both the
//! projection matrix and the [`DepthRange`] the viewport remap needs, so the
//! two can never disagree.

use crate::math::mat4::Mat4;

/// Near/far distances used to remap NDC depth into depth-buffer units.
///
/// NDC depth `z` in `[-1, 1]` becomes `z * (far - near) / 2 + (far + near) / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub near: f32,
    pub far: f32,
}

impl DepthRange {
    pub const fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }

    /// Map an NDC depth value into depth-buffer units.
    #[inline]
    pub fn remap(&self, z: f32) -> f32 {
        let f1 = (self.far - self.near) / 2.0;
        let f2 = (self.far + self.near) / 2.0;
        z * f1 + f2
    }
}

impl Default for DepthRange {
    fn default() -> Self {
        Self::new(0.1, 50.0)
    }
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    /// Vertical field of view in radians.
    fov_y: f32,
    /// Aspect ratio (width / height).
    aspect_ratio: f32,
    /// Near clipping plane distance.
    z_near: f32,
    /// Far clipping plane distance.
    z_far: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect_ratio` - Width divided by height
    /// * `z_near` - Near clipping plane distance (must be > 0)
    /// * `z_far` - Far clipping plane distance (must be > z_near)
    pub fn new(fov_y: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y,
            aspect_ratio,
            z_near,
            z_far,
        }
    }

    /// Creates a projection from degrees instead of radians.
    pub fn from_degrees(fov_y_degrees: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self::new(fov_y_degrees.to_radians(), aspect_ratio, z_near, z_far)
    }

    /// Returns the vertical field of view in radians.
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// Generates the right-handed perspective projection matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.z_near, self.z_far)
    }

    pub fn depth_range(&self) -> DepthRange {
        DepthRange::new(self.z_near, self.z_far)
    }
}
