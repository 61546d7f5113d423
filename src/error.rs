//! Errors reported by the rasterizer.
//!
//! All of these are caller errors: a draw is deterministic, so nothing here is
//! worth retrying.

use thiserror::Error;

use crate::geometry::BufferKind;
use crate::render::Primitive;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("framebuffer dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("no {kind} buffer is registered under handle {id}")]
    HandleNotFound { kind: BufferKind, id: u32 },

    #[error("triangle {triangle} references {kind} slot {index}, but the buffer holds {len} entries")]
    IndexOutOfRange {
        triangle: usize,
        kind: BufferKind,
        index: u32,
        len: usize,
    },

    #[error("primitive {0:?} is not supported, only triangle lists can be drawn")]
    UnsupportedPrimitive(Primitive),
}
