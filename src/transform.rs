//! Model, view and projection state for a draw call.
//!
//! [`Transforms`] bundles the three matrices together with the depth range the
//! viewport remap uses. The orchestrator keeps one current bundle (replaced
//! slot-by-slot through its `set_*` methods) and snapshots it at the start of
//! every draw; callers that prefer not to share state can pass a bundle
//! straight to `Rasterizer::draw_with`.

use crate::math::mat4::Mat4;
use crate::projection::{DepthRange, Projection};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transforms {
    model: Mat4,
    view: Mat4,
    projection: Mat4,
    depth_range: DepthRange,
}

impl Transforms {
    /// Identity matrices and the default depth range.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn depth_range(&self) -> DepthRange {
        self.depth_range
    }

    pub fn set_model(&mut self, model: Mat4) -> &mut Self {
        self.model = model;
        self
    }

    pub fn set_view(&mut self, view: Mat4) -> &mut Self {
        self.view = view;
        self
    }

    pub fn set_projection(&mut self, projection: Mat4) -> &mut Self {
        self.projection = projection;
        self
    }

    pub fn set_depth_range(&mut self, depth_range: DepthRange) -> &mut Self {
        self.depth_range = depth_range;
        self
    }

    /// Set the projection matrix and the depth range from the same parameters.
    pub fn set_perspective(&mut self, projection: &Projection) -> &mut Self {
        self.projection = projection.matrix();
        self.depth_range = projection.depth_range();
        self
    }

    /// The composed `projection * view * model` matrix.
    pub fn mvp(&self) -> Mat4 {
        self.projection * self.view * self.model
    }
}
