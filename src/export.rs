//! Turning a rendered frame into something outside the rasterizer can use.
//!
//! Frames are `width * height` RGB triples in 0..=255, row 0 at the top. Both
//! PNG output and the ARGB8888 streaming texture use that row order, so no
//! flipping happens here.

use std::path::Path;

use image::error::{ParameterError, ParameterErrorKind};
use image::{ImageError, RgbImage};

use crate::math::vec3::Vec3;

#[inline]
fn channel(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// Copy a frame into an 8-bit RGB image.
///
/// Fails with a dimension-mismatch parameter error if `frame.len()` is not
/// `width * height`.
pub fn to_rgb_image(frame: &[Vec3], width: u32, height: u32) -> Result<RgbImage, ImageError> {
    if frame.len() as u64 != u64::from(width) * u64::from(height) {
        return Err(dimension_mismatch());
    }

    let raw: Vec<u8> = frame
        .iter()
        .flat_map(|c| [channel(c.x), channel(c.y), channel(c.z)])
        .collect();
    RgbImage::from_raw(width, height, raw).ok_or_else(dimension_mismatch)
}

fn dimension_mismatch() -> ImageError {
    ImageError::Parameter(ParameterError::from_kind(
        ParameterErrorKind::DimensionMismatch,
    ))
}

/// Encode a frame as PNG at `path`.
pub fn save_png<P: AsRef<Path>>(
    frame: &[Vec3],
    width: u32,
    height: u32,
    path: P,
) -> Result<(), ImageError> {
    to_rgb_image(frame, width, height)?.save_with_format(path, image::ImageFormat::Png)
}

/// Pack a frame as opaque `0xAARRGGBB` pixels.
pub fn to_argb8888(frame: &[Vec3]) -> Vec<u32> {
    frame
        .iter()
        .map(|c| {
            0xFF00_0000
                | (channel(c.x) as u32) << 16
                | (channel(c.y) as u32) << 8
                | channel(c.z) as u32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn channels_are_clamped_and_truncated() {
        let frame = [Vec3::new(-4.0, 127.9, 300.0)];
        let img = to_rgb_image(&frame, 1, 1).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 127, 255]));
    }

    #[test]
    fn rows_keep_framebuffer_order() {
        let top = Vec3::new(255.0, 0.0, 0.0);
        let bottom = Vec3::new(0.0, 0.0, 255.0);
        let img = to_rgb_image(&[top, top, bottom, bottom], 2, 2).unwrap();
        assert_eq!(img.get_pixel(1, 0), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(0, 1), &Rgb([0, 0, 255]));
    }

    #[test]
    fn argb_packing() {
        let packed = to_argb8888(&[Vec3::new(0x12 as f32, 0x34 as f32, 0x56 as f32)]);
        assert_eq!(packed, vec![0xFF12_3456]);
    }

    #[test]
    fn png_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let frame = vec![Vec3::new(10.0, 20.0, 30.0); 6];

        save_png(&frame, 3, 2, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(2, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn mismatched_size_is_an_error() {
        assert!(matches!(
            to_rgb_image(&[Vec3::ZERO; 3], 2, 2),
            Err(ImageError::Parameter(_))
        ));
        assert!(to_rgb_image(&[Vec3::ZERO; 5], 2, 2).is_err());
    }

    #[test]
    fn short_frame_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.png");

        let err = save_png(&[Vec3::ZERO; 3], 2, 2, &path).unwrap_err();
        assert!(matches!(err, ImageError::Parameter(_)));
        assert!(!path.exists());
    }
}
