//! Uploaded geometry, referenced by handle.
//!
//! [`GeometryStore`] owns three independent buffer kinds: positions, index
//! triples and per-vertex colours. Every load appends a fresh buffer and hands
//! back a kind-tagged handle. Handles come from one counter shared by all three
//! kinds, so an id is unique across the whole store. Buffers are never freed or
//! overwritten, which lets the same geometry be drawn again under different
//! transforms without re-uploading it.
//!
//! Nothing is validated at load time; a triangle that references a slot past
//! the end of its position or colour buffer is reported when it is drawn.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::error::RasterError;
use crate::math::vec3::Vec3;

/// A triangle defined by three indices into the position and colour buffers.
///
/// The order of `a`, `b`, `c` sets the winding of the triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Face {
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    pub const fn indices(&self) -> [u32; 3] {
        [self.a, self.b, self.c]
    }
}

impl From<[u32; 3]> for Face {
    fn from([a, b, c]: [u32; 3]) -> Self {
        Self::new(a, b, c)
    }
}

/// The three kinds of buffer the store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Position,
    Index,
    Color,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferKind::Position => write!(f, "position"),
            BufferKind::Index => write!(f, "index"),
            BufferKind::Color => write!(f, "color"),
        }
    }
}

/// Handle to a buffer of model-space positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionHandle(u32);

/// Handle to a buffer of [`Face`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexHandle(u32);

/// Handle to a buffer of per-vertex colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorHandle(u32);

impl PositionHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl IndexHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl ColorHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// The three handles produced by importing a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandles {
    pub positions: PositionHandle,
    pub indices: IndexHandle,
    pub colors: ColorHandle,
}

/// Errors that can occur while importing a mesh file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read OBJ file '{path}': {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ file '{0}' contains no triangles")]
    Empty(String),
}

#[derive(Debug, Default)]
pub struct GeometryStore {
    next_id: u32,
    positions: HashMap<u32, Vec<Vec3>>,
    indices: HashMap<u32, Vec<Face>>,
    colors: HashMap<u32, Vec<Vec3>>,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn load_positions(&mut self, positions: Vec<Vec3>) -> PositionHandle {
        let id = self.next_id();
        self.positions.insert(id, positions);
        PositionHandle(id)
    }

    pub fn load_indices(&mut self, indices: Vec<Face>) -> IndexHandle {
        let id = self.next_id();
        self.indices.insert(id, indices);
        IndexHandle(id)
    }

    /// Colours are stored as given (0..=255 per channel).
    pub fn load_colors(&mut self, colors: Vec<Vec3>) -> ColorHandle {
        let id = self.next_id();
        self.colors.insert(id, colors);
        ColorHandle(id)
    }

    pub fn positions(&self, handle: PositionHandle) -> Result<&[Vec3], RasterError> {
        self.positions
            .get(&handle.0)
            .map(Vec::as_slice)
            .ok_or(RasterError::HandleNotFound {
                kind: BufferKind::Position,
                id: handle.0,
            })
    }

    pub fn indices(&self, handle: IndexHandle) -> Result<&[Face], RasterError> {
        self.indices
            .get(&handle.0)
            .map(Vec::as_slice)
            .ok_or(RasterError::HandleNotFound {
                kind: BufferKind::Index,
                id: handle.0,
            })
    }

    pub fn colors(&self, handle: ColorHandle) -> Result<&[Vec3], RasterError> {
        self.colors
            .get(&handle.0)
            .map(Vec::as_slice)
            .ok_or(RasterError::HandleNotFound {
                kind: BufferKind::Color,
                id: handle.0,
            })
    }

    /// Import every object in an OBJ file as one set of buffers.
    ///
    /// Polygons are triangulated. OBJ vertex colours (given in 0..=1) are
    /// scaled to 0..=255; meshes without them get `fallback_color`.
    pub fn load_obj<P: AsRef<Path>>(
        &mut self,
        path: P,
        fallback_color: Vec3,
    ) -> Result<MeshHandles, LoadError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let (models, _materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| LoadError::Obj {
                path: display.clone(),
                source,
            })?;

        let mut positions = Vec::new();
        let mut colors = Vec::new();
        let mut faces = Vec::new();

        for model in &models {
            let mesh = &model.mesh;
            let base = positions.len() as u32;
            let has_colors = mesh.vertex_color.len() == mesh.positions.len();

            for (i, p) in mesh.positions.chunks_exact(3).enumerate() {
                positions.push(Vec3::new(p[0], p[1], p[2]));
                let color = if has_colors {
                    let c = &mesh.vertex_color[i * 3..i * 3 + 3];
                    Vec3::new(c[0], c[1], c[2]) * 255.0
                } else {
                    fallback_color
                };
                colors.push(color);
            }

            faces.extend(
                mesh.indices
                    .chunks_exact(3)
                    .map(|t| Face::new(base + t[0], base + t[1], base + t[2])),
            );
        }

        if faces.is_empty() {
            return Err(LoadError::Empty(display));
        }

        log::debug!(
            "loaded '{}': {} vertices, {} triangles from {} object(s)",
            display,
            positions.len(),
            faces.len(),
            models.len()
        );

        Ok(MeshHandles {
            positions: self.load_positions(positions),
            indices: self.load_indices(faces),
            colors: self.load_colors(colors),
        })
    }
}
