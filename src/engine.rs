//! Core rendering engine.
//!
//! The [`Rasterizer`] struct is the main entry point. It owns uploaded
//! geometry, the current transforms and the frame, and runs the pipeline for
//! each draw call:
//!
//! ```text
//! geometry lookup -> MVP -> clip (w > ε) -> divide + viewport -> scan convert
//!                                                      -> SSAA resolve
//! ```
//!
//! A draw fully completes, including the SSAA resolve, before it returns.
//! Every triangle's indices are checked before the first sample is written,
//! so a failing draw leaves the frame exactly as it was.

use std::path::Path;

use log::{debug, trace};

use crate::clipper::{ClipSpacePolygon, ClipSpaceVertex, Viewport};
use crate::error::RasterError;
use crate::geometry::{
    BufferKind, ColorHandle, Face, GeometryStore, IndexHandle, LoadError, MeshHandles,
    PositionHandle,
};
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::projection::{DepthRange, Projection};
use crate::render::{Buffers, EdgeFunctionRasterizer, FrameState, Primitive, ShadingMode, Triangle};
use crate::transform::Transforms;

/// What happened to the triangles of one draw call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Index triples submitted.
    pub triangles: usize,
    /// Triangles entirely behind the camera plane.
    pub clipped_away: usize,
    /// Screen-space triangles skipped for having no area.
    pub degenerate: usize,
    /// Samples that passed the depth test.
    pub samples_written: usize,
}

pub struct Rasterizer {
    width: u32,
    height: u32,
    geometry: GeometryStore,
    transforms: Transforms,
    frame: FrameState,
    scan: EdgeFunctionRasterizer,
}

impl Rasterizer {
    /// Create a rasterizer with a `width` x `height` framebuffer.
    ///
    /// With `ssaa` the depth buffer and a shadow colour buffer are allocated
    /// at twice the resolution on each axis. Sizes are fixed from here on.
    pub fn new(width: u32, height: u32, ssaa: bool) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimensions { width, height });
        }

        Ok(Self {
            width,
            height,
            geometry: GeometryStore::new(),
            transforms: Transforms::new(),
            frame: FrameState::new(width, height, ssaa),
            scan: EdgeFunctionRasterizer::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn ssaa(&self) -> bool {
        self.frame.ssaa()
    }

    // ============ Geometry ============

    pub fn load_positions(&mut self, positions: Vec<Vec3>) -> PositionHandle {
        self.geometry.load_positions(positions)
    }

    pub fn load_indices(&mut self, indices: Vec<Face>) -> IndexHandle {
        self.geometry.load_indices(indices)
    }

    pub fn load_colors(&mut self, colors: Vec<Vec3>) -> ColorHandle {
        self.geometry.load_colors(colors)
    }

    pub fn load_obj<P: AsRef<Path>>(
        &mut self,
        path: P,
        fallback_color: Vec3,
    ) -> Result<MeshHandles, LoadError> {
        self.geometry.load_obj(path, fallback_color)
    }

    pub fn geometry(&self) -> &GeometryStore {
        &self.geometry
    }

    // ============ Transforms ============

    pub fn set_model(&mut self, model: Mat4) {
        self.transforms.set_model(model);
    }

    pub fn set_view(&mut self, view: Mat4) {
        self.transforms.set_view(view);
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.transforms.set_projection(projection);
    }

    pub fn set_depth_range(&mut self, depth_range: DepthRange) {
        self.transforms.set_depth_range(depth_range);
    }

    /// Set the projection matrix and depth range from one [`Projection`].
    pub fn set_perspective(&mut self, projection: &Projection) {
        self.transforms.set_perspective(projection);
    }

    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    // ============ Shading ============

    pub fn set_shading_mode(&mut self, mode: ShadingMode) {
        self.scan.set_shading(mode);
    }

    pub fn shading_mode(&self) -> ShadingMode {
        self.scan.shading()
    }

    // ============ Frame ============

    pub fn clear(&mut self, buffers: Buffers) {
        self.frame.clear(buffers);
    }

    /// The rendered colours, `width * height` RGB triples, row 0 at the top.
    pub fn frame_buffer(&self) -> &[Vec3] {
        self.frame.frame_buffer()
    }

    /// Colour of pixel (x, y), y pointing up. `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Vec3> {
        self.frame.pixel(x, y)
    }

    /// Stored depth of sample (x, y); in SSAA mode coordinates are in samples.
    /// `None` outside the sample grid.
    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        self.frame.depth(x, y)
    }

    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    // ============ Drawing ============

    /// Draw with the current model, view and projection.
    pub fn draw(
        &mut self,
        positions: PositionHandle,
        indices: IndexHandle,
        colors: ColorHandle,
        primitive: Primitive,
    ) -> Result<DrawStats, RasterError> {
        let transforms = self.transforms;
        self.draw_with(&transforms, positions, indices, colors, primitive)
    }

    /// Draw with an explicit transform bundle, ignoring the current one.
    pub fn draw_with(
        &mut self,
        transforms: &Transforms,
        positions: PositionHandle,
        indices: IndexHandle,
        colors: ColorHandle,
        primitive: Primitive,
    ) -> Result<DrawStats, RasterError> {
        if primitive != Primitive::Triangle {
            return Err(RasterError::UnsupportedPrimitive(primitive));
        }

        let clip_triangles = self.assemble(transforms.mvp(), positions, indices, colors)?;
        let viewport = Viewport::new(self.width, self.height, transforms.depth_range());
        let flat = self.scan.shading() == ShadingMode::Flat;

        let mut stats = DrawStats {
            triangles: clip_triangles.len(),
            ..DrawStats::default()
        };

        for (index, vertices) in clip_triangles.into_iter().enumerate() {
            let face_color = vertices[0].color;

            if vertices.iter().all(ClipSpaceVertex::is_inside) {
                self.fill(&viewport, vertices, flat.then_some(face_color), &mut stats);
                continue;
            }

            let [a, b, c] = vertices;
            let polygon = ClipSpacePolygon::from_triangle(a, b, c).clip();
            if polygon.is_empty() {
                trace!("triangle {} lies behind the camera plane", index);
                stats.clipped_away += 1;
                continue;
            }
            for piece in polygon.triangulate() {
                self.fill(&viewport, piece, flat.then_some(face_color), &mut stats);
            }
        }

        self.frame.resolve();

        debug!(
            "draw: {} triangles, {} clipped away, {} degenerate, {} samples written",
            stats.triangles, stats.clipped_away, stats.degenerate, stats.samples_written
        );
        Ok(stats)
    }

    /// Look up the buffers and move every referenced vertex into clip space.
    fn assemble(
        &self,
        mvp: Mat4,
        positions: PositionHandle,
        indices: IndexHandle,
        colors: ColorHandle,
    ) -> Result<Vec<[ClipSpaceVertex; 3]>, RasterError> {
        let positions = self.geometry.positions(positions)?;
        let faces = self.geometry.indices(indices)?;
        let colors = self.geometry.colors(colors)?;

        let fetch = |triangle: usize, index: u32| -> Result<ClipSpaceVertex, RasterError> {
            let slot = index as usize;
            let position = positions.get(slot).ok_or(RasterError::IndexOutOfRange {
                triangle,
                kind: BufferKind::Position,
                index,
                len: positions.len(),
            })?;
            let color = colors.get(slot).ok_or(RasterError::IndexOutOfRange {
                triangle,
                kind: BufferKind::Color,
                index,
                len: colors.len(),
            })?;
            Ok(ClipSpaceVertex::new(mvp * Vec4::from(*position), *color))
        };

        faces
            .iter()
            .enumerate()
            .map(|(triangle, face)| -> Result<[ClipSpaceVertex; 3], RasterError> {
                let [a, b, c] = face.indices();
                Ok([fetch(triangle, a)?, fetch(triangle, b)?, fetch(triangle, c)?])
            })
            .collect()
    }

    fn fill(
        &mut self,
        viewport: &Viewport,
        vertices: [ClipSpaceVertex; 3],
        face_color: Option<Vec3>,
        stats: &mut DrawStats,
    ) {
        let colors = match face_color {
            Some(color) => [color; 3],
            None => vertices.map(|v| v.color),
        };
        let triangle = Triangle::new(vertices.map(|v| viewport.to_screen(v.position)), colors);

        match self.scan.fill_triangle(&triangle, &mut self.frame) {
            Some(written) => stats.samples_written += written,
            None => {
                trace!("skipping degenerate triangle {:?}", triangle.vertices);
                stats.degenerate += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RED: Vec3 = Vec3::new(255.0, 0.0, 0.0);
    const BLUE: Vec3 = Vec3::new(0.0, 0.0, 255.0);
    const NEAR_COLOR: Vec3 = Vec3::new(217.0, 238.0, 185.0);
    const FAR_COLOR: Vec3 = Vec3::new(185.0, 217.0, 238.0);

    /// Two triangles in NDC (identity transforms) covering the same area at different depths.
    fn overlapping_pair(
        r: &mut Rasterizer,
        near_first: bool,
    ) -> [(PositionHandle, IndexHandle, ColorHandle); 2] {
        let mut make = |z: f32, color: Vec3| {
            let p = r.load_positions(vec![
                Vec3::new(-0.8, -0.8, z),
                Vec3::new(0.8, -0.8, z),
                Vec3::new(0.0, 0.8, z),
            ]);
            let i = r.load_indices(vec![Face::new(0, 1, 2)]);
            let c = r.load_colors(vec![color; 3]);
            (p, i, c)
        };
        // Larger NDC z is nearer.
        let near = make(0.5, RED);
        let far = make(-0.5, BLUE);
        if near_first {
            [near, far]
        } else {
            [far, near]
        }
    }

    fn two_triangle_scene(r: &mut Rasterizer, near_first: bool) -> Result<(), RasterError> {
        let near = [
            Vec3::new(2.0, 0.0, -2.0),
            Vec3::new(0.0, 2.0, -2.0),
            Vec3::new(-2.0, 0.0, -2.0),
        ];
        let far = [
            Vec3::new(3.5, -1.0, -5.0),
            Vec3::new(2.5, 1.5, -5.0),
            Vec3::new(-1.0, 0.5, -5.0),
        ];
        let (first, second) = if near_first { (near, far) } else { (far, near) };
        let (c1, c2) = if near_first {
            (NEAR_COLOR, FAR_COLOR)
        } else {
            (FAR_COLOR, NEAR_COLOR)
        };

        let mut positions = first.to_vec();
        positions.extend(second);
        let pos = r.load_positions(positions);
        let ind = r.load_indices(vec![Face::new(0, 1, 2), Face::new(3, 4, 5)]);
        let col = r.load_colors(vec![c1, c1, c1, c2, c2, c2]);

        r.clear(Buffers::COLOR | Buffers::DEPTH);
        r.set_model(Mat4::identity());
        r.set_view(Mat4::view_from_eye(Vec3::new(0.0, 0.0, 5.0)));
        r.set_perspective(&Projection::from_degrees(45.0, 1.0, 0.1, 50.0));
        r.draw(pos, ind, col, Primitive::Triangle).map(|_| ())
    }

    #[test]
    fn rejects_empty_framebuffer() {
        assert_eq!(
            Rasterizer::new(0, 10, false).err(),
            Some(RasterError::InvalidDimensions {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn readback_past_the_edge_is_none() {
        let r = Rasterizer::new(8, 6, false).unwrap();
        assert_eq!(r.pixel(7, 5), Some(Vec3::ZERO));
        assert_eq!(r.pixel(7, 6), None);
        assert_eq!(r.depth(8, 0), None);
    }

    #[test]
    fn nearer_triangle_wins_regardless_of_order() {
        for near_first in [true, false] {
            let mut r = Rasterizer::new(64, 64, false).unwrap();
            for (p, i, c) in overlapping_pair(&mut r, near_first) {
                r.draw(p, i, c, Primitive::Triangle).unwrap();
            }
            assert_eq!(r.pixel(32, 28).unwrap(), RED);
        }
    }

    #[test]
    fn drawing_twice_matches_drawing_once() {
        let mut once = Rasterizer::new(64, 64, false).unwrap();
        let mut twice = Rasterizer::new(64, 64, false).unwrap();
        let [(p, i, c), _] = overlapping_pair(&mut once, true);
        once.draw(p, i, c, Primitive::Triangle).unwrap();

        let [(p, i, c), _] = overlapping_pair(&mut twice, true);
        twice.draw(p, i, c, Primitive::Triangle).unwrap();
        let stats = twice.draw(p, i, c, Primitive::Triangle).unwrap();

        assert_eq!(stats.samples_written, 0);
        assert_eq!(once.frame_buffer(), twice.frame_buffer());
    }

    #[test]
    fn two_triangle_scene_shows_nearer_triangle_in_overlap() {
        for ssaa in [false, true] {
            for near_first in [true, false] {
                let mut r = Rasterizer::new(700, 700, ssaa).unwrap();
                two_triangle_scene(&mut r, near_first).unwrap();
                // Inside both triangles' projections.
                assert_eq!(r.pixel(434, 392).unwrap(), NEAR_COLOR);
                // Inside only the nearer one.
                assert_eq!(r.pixel(350, 410).unwrap(), NEAR_COLOR);
                assert_eq!(r.pixel(0, 0).unwrap(), Vec3::ZERO);
            }
        }
    }

    #[test]
    fn stored_depth_matches_depth_range_remap() {
        let mut r = Rasterizer::new(64, 64, false).unwrap();
        let [(p, i, c), _] = overlapping_pair(&mut r, true);
        r.set_depth_range(DepthRange::new(1.0, 3.0));
        r.draw(p, i, c, Primitive::Triangle).unwrap();
        // NDC z = 0.5 -> 0.5 * 1.0 + 2.0
        assert_relative_eq!(r.depth(32, 28).unwrap(), -2.5, epsilon = 1e-5);
    }

    #[test]
    fn explicit_transforms_ignore_current_state() {
        let mut r = Rasterizer::new(64, 64, false).unwrap();
        let [(p, i, c), _] = overlapping_pair(&mut r, true);
        r.set_model(Mat4::translation(100.0, 0.0, 0.0));

        let stats = r
            .draw_with(&Transforms::new(), p, i, c, Primitive::Triangle)
            .unwrap();
        assert!(stats.samples_written > 0);
        assert_eq!(r.pixel(32, 28).unwrap(), RED);
    }

    #[test]
    fn unsupported_primitive_fails_without_drawing() {
        let mut r = Rasterizer::new(16, 16, false).unwrap();
        let [(p, i, c), _] = overlapping_pair(&mut r, true);
        assert_eq!(
            r.draw(p, i, c, Primitive::Line),
            Err(RasterError::UnsupportedPrimitive(Primitive::Line))
        );
        assert!(r.frame_buffer().iter().all(|&px| px == Vec3::ZERO));
    }

    #[test]
    fn unknown_handle_is_reported() {
        let mut other = Rasterizer::new(4, 4, false).unwrap();
        for _ in 0..5 {
            other.load_colors(vec![]);
        }
        let stray = other.load_positions(vec![]);

        let mut r = Rasterizer::new(4, 4, false).unwrap();
        let i = r.load_indices(vec![]);
        let c = r.load_colors(vec![]);
        assert_eq!(
            r.draw(stray, i, c, Primitive::Triangle),
            Err(RasterError::HandleNotFound {
                kind: BufferKind::Position,
                id: 5
            })
        );
    }

    #[test]
    fn out_of_range_index_leaves_frame_untouched() {
        let mut r = Rasterizer::new(32, 32, false).unwrap();
        let p = r.load_positions(vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        let i = r.load_indices(vec![Face::new(0, 1, 2), Face::new(0, 1, 7)]);
        let c = r.load_colors(vec![RED; 3]);

        assert_eq!(
            r.draw(p, i, c, Primitive::Triangle),
            Err(RasterError::IndexOutOfRange {
                triangle: 1,
                kind: BufferKind::Position,
                index: 7,
                len: 3
            })
        );
        assert!(r.frame_buffer().iter().all(|&px| px == Vec3::ZERO));
    }

    #[test]
    fn short_color_buffer_is_reported() {
        let mut r = Rasterizer::new(8, 8, false).unwrap();
        let p = r.load_positions(vec![Vec3::ZERO; 3]);
        let i = r.load_indices(vec![Face::new(0, 1, 2)]);
        let c = r.load_colors(vec![RED; 2]);
        assert!(matches!(
            r.draw(p, i, c, Primitive::Triangle),
            Err(RasterError::IndexOutOfRange {
                kind: BufferKind::Color,
                index: 2,
                ..
            })
        ));
    }

    #[test]
    fn degenerate_triangles_are_counted_not_drawn() {
        let mut r = Rasterizer::new(16, 16, false).unwrap();
        let p = r.load_positions(vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
        ]);
        let i = r.load_indices(vec![Face::new(0, 1, 2)]);
        let c = r.load_colors(vec![RED; 3]);
        let stats = r.draw(p, i, c, Primitive::Triangle).unwrap();
        assert_eq!(stats.degenerate, 1);
        assert_eq!(stats.samples_written, 0);
        assert!(r.frame_buffer().iter().all(|&px| px == Vec3::ZERO));
    }

    #[test]
    fn triangle_crossing_camera_plane_is_clipped() {
        let mut r = Rasterizer::new(64, 64, false).unwrap();
        r.set_perspective(&Projection::from_degrees(90.0, 1.0, 0.1, 50.0));

        let p = r.load_positions(vec![
            Vec3::new(-1.0, -0.5, -2.0),
            Vec3::new(1.0, -0.5, -2.0),
            Vec3::new(0.0, 1.0, 2.0),
            Vec3::new(-1.0, 0.0, 3.0),
            Vec3::new(1.0, 0.0, 3.0),
            Vec3::new(0.0, 1.0, 3.0),
        ]);
        let i = r.load_indices(vec![Face::new(0, 1, 2), Face::new(3, 4, 5)]);
        let c = r.load_colors(vec![RED; 6]);

        let stats = r.draw(p, i, c, Primitive::Triangle).unwrap();
        assert_eq!(stats.triangles, 2);
        assert_eq!(stats.clipped_away, 1);
        assert!(stats.samples_written > 0);
        assert!(r.frame_buffer().iter().all(|px| px.is_finite()));
    }

    #[test]
    fn gouraud_mode_blends_through_pipeline() {
        let mut r = Rasterizer::new(64, 64, true).unwrap();
        r.set_shading_mode(ShadingMode::Gouraud);
        let p = r.load_positions(vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        let i = r.load_indices(vec![Face::new(0, 1, 2)]);
        let c = r.load_colors(vec![RED, Vec3::new(0.0, 255.0, 0.0), BLUE]);
        r.draw(p, i, c, Primitive::Triangle).unwrap();

        let center = r.pixel(32, 24).unwrap();
        assert!(center.x > 0.0 && center.y > 0.0 && center.z > 0.0);
        assert_eq!(r.shading_mode(), ShadingMode::Gouraud);
    }
}
