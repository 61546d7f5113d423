//! Clip-space processing between the vertex transform and scan conversion.
//!
//! - [`clip_space`]: Sutherland-Hodgman clipping of triangles against the
//!   `w >= W_EPSILON` half-space, so the perspective divide never sees a
//!   vertex on or behind the camera plane.
//! - [`viewport`]: the perspective divide and the mapping from normalized
//!   device coordinates to pixel coordinates and depth-buffer units.

pub mod clip_space;
pub mod viewport;

pub use clip_space::{ClipSpacePolygon, ClipSpaceVertex, W_EPSILON};
pub use viewport::Viewport;
