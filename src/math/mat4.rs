//! 4x4 transformation matrix using column-vector convention.
//!
//! # Convention
//! - Vectors are **column vectors** on the right: `Mat4 * Vec`
//! - Translation is stored in the **last column**
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//!
//! The camera helpers here follow a right-handed setup: the camera looks down
//! `-z`, and [`Mat4::perspective_rh`] produces clip coordinates whose `w` is the
//! distance in front of the camera.

use std::ops::Mul;

use super::vec3::Vec3;
use super::vec4::Vec4;

/// 4x4 matrix stored as `data[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    data: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub fn new(data: [[f32; 4]; 4]) -> Self {
        Mat4 { data }
    }

    pub fn identity() -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a translation matrix.
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a scale matrix.
    pub fn scaling(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation around the Z axis, angle in radians.
    pub fn rotation_z(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Mat4::new([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotation_z_degrees(degrees: f32) -> Self {
        Self::rotation_z(degrees.to_radians())
    }

    /// View matrix for a camera at `eye` looking down `-z` with `+y` up.
    pub fn view_from_eye(eye: Vec3) -> Self {
        Self::translation(-eye.x, -eye.y, -eye.z)
    }

    /// Right-handed perspective projection.
    ///
    /// `near` and `far` are positive distances along the viewing direction.
    /// After the perspective divide, `z` is `+1` on the near plane and `-1` on
    /// the far plane, and clip-space `w` equals `-z_view`, so geometry in front
    /// of the camera always has `w > 0`.
    ///
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect_ratio` - Width divided by height
    /// * `near`, `far` - Clipping plane distances, `0 < near < far`
    pub fn perspective_rh(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let t = (fov_y / 2.0).tan();
        let r = t * aspect_ratio;
        let a = (near + far) / (far - near);
        let b = 2.0 * near * far / (far - near);
        Mat4::new([
            [1.0 / r, 0.0, 0.0, 0.0],
            [0.0, 1.0 / t, 0.0, 0.0],
            [0.0, 0.0, a, b],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }
}

/// Matrix multiplication: Mat4 * Mat4.
///
/// `A * B * v` applies B first, then A.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result = [[0.0f32; 4]; 4];

        for (row, out) in result.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.data[row][k] * rhs.data[k][col]).sum();
            }
        }

        Mat4::new(result)
    }
}

/// Transform a Vec4 by a matrix: Mat4 * Vec4 (column vector).
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        let row = |r: [f32; 4]| r[0] * v.x + r[1] * v.y + r[2] * v.z + r[3] * v.w;
        Vec4::new(
            row(self.data[0]),
            row(self.data[1]),
            row(self.data[2]),
            row(self.data[3]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn identity_is_neutral() {
        let m = Mat4::translation(1.0, 2.0, 3.0);
        assert_eq!(m * Mat4::identity(), m);
        assert_eq!(Mat4::identity() * m, m);
    }

    #[test]
    fn multiplication_applies_right_operand_first() {
        // Scale first, then translate.
        let m = Mat4::translation(1.0, 0.0, 0.0) * Mat4::scaling(2.0, 2.0, 2.0);
        let p = m * Vec4::point(1.0, 1.0, 1.0);
        assert_eq!(p, Vec4::point(3.0, 2.0, 2.0));
    }

    #[test]
    fn rotation_z_is_counter_clockwise() {
        let p = Mat4::rotation_z(FRAC_PI_2) * Vec4::point(1.0, 0.0, 0.0);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let m = Mat4::perspective_rh(45f32.to_radians(), 1.0, 0.1, 50.0);

        let near = m * Vec4::point(0.0, 0.0, -0.1);
        assert_relative_eq!(near.w, 0.1, epsilon = 1e-6);
        assert_relative_eq!(near.z / near.w, 1.0, epsilon = 1e-4);

        let far = m * Vec4::point(0.0, 0.0, -50.0);
        assert_relative_eq!(far.w, 50.0, epsilon = 1e-4);
        assert_relative_eq!(far.z / far.w, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn view_moves_eye_to_origin() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let p = Mat4::view_from_eye(eye) * Vec4::from_vec3(eye, 1.0);
        assert_eq!(p, Vec4::point(0.0, 0.0, 0.0));
    }
}
