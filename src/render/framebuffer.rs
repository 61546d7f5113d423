//! Colour and depth storage for one rasterizer.
//!
//! [`FrameState`] owns the display colour buffer, the depth buffer and, when
//! supersampling is enabled, a shadow colour buffer at twice the resolution on
//! each axis. All buffers are sized once at construction and mutated in place.
//!
//! # Layout
//!
//! Rasterizer coordinates have `y` pointing up, while row 0 of every buffer is
//! the top of the displayed image:
//!
//! ```text
//! index(x, y)        = (height - 1 - y) * width + x
//! sample_index(x, y) = (2*height - 1 - y) * 2*width + x     (SSAA)
//! ```
//!
//! # Depth Buffer
//!
//! The depth buffer holds one value per sample: the negated interpolated depth
//! of the surface last written there. Smaller is nearer, and a cleared entry is
//! `+inf`. A colour is only ever written together with its depth, so the two
//! buffers never disagree about which surface a sample shows.

use std::ops::BitOr;

use crate::math::vec3::Vec3;

/// Selects which buffers [`FrameState::clear`] resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buffers(u8);

impl Buffers {
    pub const COLOR: Buffers = Buffers(0b01);
    pub const DEPTH: Buffers = Buffers(0b10);
    pub const ALL: Buffers = Buffers(0b11);

    pub fn contains(self, other: Buffers) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Buffers {
    type Output = Buffers;

    fn bitor(self, rhs: Buffers) -> Buffers {
        Buffers(self.0 | rhs.0)
    }
}

/// Sub-pixel sample positions for 2x2 supersampling, in the order they are tested.
const SSAA_OFFSETS: [(f32, f32); 4] = [(0.25, 0.25), (0.25, 0.75), (0.75, 0.25), (0.75, 0.75)];

/// Direct mode samples the integer pixel coordinate itself.
const DIRECT_OFFSETS: [(f32, f32); 1] = [(0.0, 0.0)];

pub struct FrameState {
    width: usize,
    height: usize,
    ssaa: bool,
    color_buffer: Vec<Vec3>,
    depth_buffer: Vec<f32>,
    /// Per-sample colours; empty unless supersampling.
    sample_buffer: Vec<Vec3>,
}

impl FrameState {
    /// Allocate buffers for a `width` x `height` image.
    ///
    /// Colour starts black and depth starts at `+inf`.
    pub fn new(width: u32, height: u32, ssaa: bool) -> Self {
        let width = width as usize;
        let height = height as usize;
        let pixels = width * height;
        let samples = if ssaa { 4 * pixels } else { pixels };

        Self {
            width,
            height,
            ssaa,
            color_buffer: vec![Vec3::ZERO; pixels],
            depth_buffer: vec![f32::INFINITY; samples],
            sample_buffer: if ssaa {
                vec![Vec3::ZERO; samples]
            } else {
                Vec::new()
            },
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn ssaa(&self) -> bool {
        self.ssaa
    }

    /// Samples per pixel along each axis (1, or 2 with SSAA).
    #[inline]
    pub fn samples_per_axis(&self) -> usize {
        if self.ssaa {
            2
        } else {
            1
        }
    }

    pub fn sample_width(&self) -> usize {
        self.width * self.samples_per_axis()
    }

    pub fn sample_height(&self) -> usize {
        self.height * self.samples_per_axis()
    }

    /// Offsets from a pixel's integer coordinate at which coverage is tested.
    pub fn sample_offsets(&self) -> &'static [(f32, f32)] {
        if self.ssaa {
            &SSAA_OFFSETS
        } else {
            &DIRECT_OFFSETS
        }
    }

    /// Buffer index of display pixel (x, y).
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`. `x` is not checked.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        (self.height - 1 - y) * self.width + x
    }

    /// Buffer index of sample (x, y) in the depth and shadow buffers.
    ///
    /// # Panics
    ///
    /// Panics if `y >= sample_height()`. `x` is not checked.
    #[inline]
    pub fn sample_index(&self, x: usize, y: usize) -> usize {
        (self.sample_height() - 1 - y) * self.sample_width() + x
    }

    /// Reset colour to black and/or depth to `+inf`.
    pub fn clear(&mut self, buffers: Buffers) {
        if buffers.contains(Buffers::COLOR) {
            self.color_buffer.fill(Vec3::ZERO);
            self.sample_buffer.fill(Vec3::ZERO);
        }
        if buffers.contains(Buffers::DEPTH) {
            self.depth_buffer.fill(f32::INFINITY);
        }
    }

    /// Write a display pixel without depth testing.
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is outside the frame.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Vec3) {
        let idx = self.index(x, y);
        self.color_buffer[idx] = color;
    }

    /// Colour of display pixel (x, y), or `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Vec3> {
        (x < self.width && y < self.height).then(|| self.color_buffer[self.index(x, y)])
    }

    /// Stored depth of sample (x, y), or `None` outside the sample grid.
    /// In direct mode samples are pixels.
    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.sample_width() && y < self.sample_height())
            .then(|| self.depth_buffer[self.sample_index(x, y)])
    }

    fn sample_color(&self, x: usize, y: usize) -> Vec3 {
        let idx = self.sample_index(x, y);
        if self.ssaa {
            self.sample_buffer[idx]
        } else {
            self.color_buffer[idx]
        }
    }

    /// Write a sample if it is strictly nearer than what is stored.
    ///
    /// `depth` is the negated interpolated depth (smaller = nearer). Equal
    /// depths do not overwrite, so the first writer wins. Returns whether the
    /// sample was written.
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is outside the sample grid. The scan converter clamps
    /// its bounding box before calling this.
    #[inline]
    pub fn write_sample(&mut self, x: usize, y: usize, depth: f32, color: Vec3) -> bool {
        let idx = self.sample_index(x, y);
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            if self.ssaa {
                self.sample_buffer[idx] = color;
            } else {
                self.color_buffer[idx] = color;
            }
            true
        } else {
            false
        }
    }

    /// Box-filter the 2x2 shadow samples of every pixel into the display buffer.
    ///
    /// Does nothing without SSAA.
    pub fn resolve(&mut self) {
        if !self.ssaa {
            return;
        }
        for x in 0..self.width {
            for y in 0..self.height {
                let (sx, sy) = (2 * x, 2 * y);
                let sum = self.sample_color(sx, sy)
                    + self.sample_color(sx, sy + 1)
                    + self.sample_color(sx + 1, sy)
                    + self.sample_color(sx + 1, sy + 1);
                self.set_pixel(x, y, sum / 4.0);
            }
        }
    }

    /// The display colour buffer, row 0 at the top, `width * height` entries.
    pub fn frame_buffer(&self) -> &[Vec3] {
        &self.color_buffer
    }
}
