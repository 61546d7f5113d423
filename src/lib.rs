//! A CPU triangle rasterizer with a z-buffer and optional 2x2 supersampling.
//!
//! Geometry is uploaded once and referenced by handle. Each draw call moves
//! the vertices through model, view and projection, clips against the camera
//! plane, maps to the viewport and scan-converts every triangle with edge
//! functions and perspective-correct interpolation.
//!
//! # Quick Start
//!
//! ```no_run
//! use rastr::prelude::*;
//!
//! let mut r = Rasterizer::new(700, 700, true)?;
//! let pos = r.load_positions(vec![
//!     Vec3::new(2.0, 0.0, -2.0),
//!     Vec3::new(0.0, 2.0, -2.0),
//!     Vec3::new(-2.0, 0.0, -2.0),
//! ]);
//! let ind = r.load_indices(vec![Face::new(0, 1, 2)]);
//! let col = r.load_colors(vec![Vec3::new(217.0, 238.0, 185.0); 3]);
//!
//! r.clear(Buffers::COLOR | Buffers::DEPTH);
//! r.set_view(Mat4::view_from_eye(Vec3::new(0.0, 0.0, 5.0)));
//! r.set_perspective(&Projection::from_degrees(45.0, 1.0, 0.1, 50.0));
//! r.draw(pos, ind, col, Primitive::Triangle)?;
//! # Ok::<(), rastr::RasterError>(())
//! ```

pub mod clipper;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod math;
pub mod projection;
pub mod render;
pub mod transform;
#[cfg(feature = "window")]
pub mod window;

pub use engine::{DrawStats, Rasterizer};
pub use error::RasterError;
pub use geometry::{
    ColorHandle, Face, GeometryStore, IndexHandle, LoadError, MeshHandles, PositionHandle,
};
pub use projection::{DepthRange, Projection};
pub use render::{Buffers, Primitive, ShadingMode};
pub use transform::Transforms;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::{DrawStats, Rasterizer};
    pub use crate::error::RasterError;
    pub use crate::geometry::{ColorHandle, Face, IndexHandle, MeshHandles, PositionHandle};
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;
    pub use crate::projection::{DepthRange, Projection};
    pub use crate::render::{Buffers, Primitive, ShadingMode};
    pub use crate::transform::Transforms;

    #[cfg(feature = "window")]
    pub use crate::window::{FrameLimiter, FrameTexture, Window, WindowEvent};
}
