//! Screen-space rendering: frame storage and triangle scan conversion.

pub mod framebuffer;
pub mod rasterizer;

pub use framebuffer::{Buffers, FrameState};
pub use rasterizer::{EdgeFunctionRasterizer, ShadingMode, Triangle};

/// Primitive kinds a draw call can name.
///
/// Only [`Primitive::Triangle`] lists are rasterized; drawing anything else
/// fails with [`RasterError::UnsupportedPrimitive`].
///
/// [`RasterError::UnsupportedPrimitive`]: crate::error::RasterError::UnsupportedPrimitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Line,
    Triangle,
}
