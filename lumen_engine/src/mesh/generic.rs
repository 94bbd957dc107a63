use std::cell::{Cell, RefCell};
use std::rc::Rc;

use derivative::Derivative;
use getset::{CopyGetters, Getters};
use puffin::profile_function;
use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, trace};
use valuable::Valuable;

use crate::core::targets::MESH;
use crate::core::types::{GpuId, Vector3};
use crate::mesh::attribute::{AttributeSet, VertexLayout};
use crate::mesh::face::{CornerIndices, Face, FaceIndices, Vertex};
use crate::render::backend::GpuError;
use crate::render::context::RenderContext;
use crate::render::handle::GpuHandle;
use crate::render::shader::Shader;
use crate::shared::aabb::{AabbMode, BoundingBox};
use crate::shared::intersect::Hit;
use crate::shared::ray::Ray;
use crate::shared::validate;

/// Whether a mesh holds usable geometry
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Display, Valuable)]
pub enum MeshStatus {
    Ok,
    #[default]
    Unloaded,
    FileNotFound,
    /// The source was malformed, or referenced data that doesn't exist
    Failed,
}

/// Which source array an out-of-range index pointed into
#[derive(Copy, Clone, Debug, PartialEq, Eq, Valuable)]
pub enum IndexArray {
    Position,
    /// The attribute at this position in the mesh's attribute tuple
    Attribute(usize),
}

#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Valuable)]
pub enum MeshError {
    #[error("index {index} is out of range for the {array:?} array (len {len})")]
    IndexOutOfRange { array: IndexArray, index: u32, len: usize },
}

/// Lazily uploaded copy of the mesh on the GPU
#[derive(Debug, Default)]
struct GpuSlot {
    /// Set whenever the geometry changes, cleared by uploading
    dirty: Cell<bool>,
    buffer: RefCell<Option<Rc<GpuHandle>>>,
}

impl GpuSlot {
    /// Makes sure the buffer exists and holds the current geometry, and returns it
    fn prepare(&self, ctx: &mut RenderContext, bytes: impl FnOnce() -> Vec<u8>) -> GpuId {
        let mut buffer = self.buffer.borrow_mut();
        let handle = buffer.get_or_insert_with(|| ctx.create_buffer());
        let id = handle.id();
        if self.dirty.replace(false) {
            let data = bytes();
            trace!(target: MESH, buffer = id, len = data.len(), "uploading mesh");
            ctx.backend().upload_buffer(id, &data);
        }
        id
    }
}

/// A triangle mesh, where every vertex carries a position and the attribute tuple `A`.
///
/// Meshes are built once (from a file or with [Mesh::construct_faces]) and then shared between
/// objects with an [Rc]. The GPU copy is uploaded on the first draw after any change.
#[derive(Derivative, Getters, CopyGetters)]
#[derivative(Debug)]
pub struct Mesh<A: AttributeSet> {
    #[derivative(Debug = "ignore")]
    #[getset(get = "pub")]
    faces: Vec<Face<A>>,
    /// Box surrounding every position given to the mesh, referenced by a face or not
    #[getset(get_copy = "pub")]
    bbox: BoundingBox,
    #[getset(get_copy = "pub")]
    status: MeshStatus,
    /// How the vertices are laid out when uploaded
    #[getset(get = "pub")]
    layout: VertexLayout,
    gpu: GpuSlot,
}

impl<A: AttributeSet> Default for Mesh<A> {
    fn default() -> Self { Self::new() }
}

// region Constructors

impl<A: AttributeSet> Mesh<A> {
    /// An empty, [unloaded](MeshStatus::Unloaded) mesh
    pub fn new() -> Self { Self::with_status(MeshStatus::Unloaded) }

    /// An empty mesh with the given status; used to report load failures
    pub fn with_status(status: MeshStatus) -> Self {
        Self {
            faces: Vec::new(),
            bbox: BoundingBox::EMPTY,
            status,
            layout: VertexLayout::of::<A>(),
            gpu: GpuSlot::default(),
        }
    }

    /// A mesh from faces that were already built, e.g. read back from a cache
    pub fn from_faces(faces: Vec<Face<A>>, bbox: BoundingBox) -> Self {
        let mut mesh = Self::with_status(MeshStatus::Ok);
        mesh.faces = faces;
        mesh.bbox = bbox;
        mesh.gpu.dirty.set(true);
        mesh
    }

    /// Replaces the geometry with one face per entry of `indices`.
    ///
    /// Each corner takes its position from `positions` and one value from each attribute source,
    /// at that corner's indices. The bounding box covers *all* of `positions`.
    ///
    /// # Errors
    /// If any index is out of range, [MeshError::IndexOutOfRange] is returned and the mesh is left
    /// empty and [failed](MeshStatus::Failed).
    pub fn construct_faces(
        &mut self,
        positions: &[Vector3],
        indices: &[FaceIndices<A>],
        sources: A::Sources<'_>,
    ) -> Result<(), MeshError> {
        profile_function!();

        self.faces.clear();
        self.bbox = BoundingBox::EMPTY;
        self.gpu.dirty.set(true);

        let corner = |corner: &CornerIndices<A>| -> Result<Vertex<A>, MeshError> {
            let position = positions
                .get(corner.position as usize)
                .ok_or(MeshError::IndexOutOfRange {
                    array: IndexArray::Position,
                    index: corner.position,
                    len: positions.len(),
                })?;
            Ok(Vertex {
                position: *position,
                attrs: A::gather(sources, &corner.attrs)?,
            })
        };
        let faces = indices
            .iter()
            .map(|FaceIndices { corners: [a, b, c] }| -> Result<Face<A>, MeshError> {
                Ok(Face {
                    vertices: [corner(a)?, corner(b)?, corner(c)?],
                })
            })
            .collect::<Result<Vec<_>, _>>();

        match faces {
            Ok(faces) => {
                self.faces = faces;
                self.bbox = BoundingBox::encompass_points(positions);
                self.status = MeshStatus::Ok;
                debug!(target: MESH, faces = self.faces.len(), positions = positions.len(), "constructed mesh faces");
                Ok(())
            }
            Err(err) => {
                self.status = MeshStatus::Failed;
                debug!(target: MESH, error = %err, "failed constructing mesh faces");
                Err(err)
            }
        }
    }
}

// endregion Constructors

// region Impl

impl<A: AttributeSet> Mesh<A> {
    pub fn is_empty(&self) -> bool { self.faces.is_empty() }

    /// Whether the geometry has changed since it was last uploaded
    pub fn is_dirty(&self) -> bool { self.gpu.dirty.get() }

    /// Forces the next draw to re-upload the geometry
    pub fn mark_dirty(&self) { self.gpu.dirty.set(true) }

    /// The faces as one interleaved vertex buffer, laid out as [Self::layout]
    pub fn vertex_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.faces.len() * Face::<A>::byte_size());
        self.faces.iter().for_each(|f| f.write_bytes(&mut out));
        out
    }

    /// The nearest face in front of the ray, or [Hit::NONE].
    ///
    /// Rays that don't pass through the bounding box are rejected without looking at any faces.
    pub fn intersect_ray(&self, ray: &Ray) -> Hit {
        profile_function!();
        validate::ray(ray);

        // Inverted, so that rays starting inside the box still get through
        if !self.bbox.intersect_ray(ray, AabbMode::Inverted).did_hit() {
            return Hit::NONE;
        }

        let hit = self
            .faces
            .iter()
            .map(|face| face.intersect(ray))
            .fold(Hit::NONE, Hit::nearest);
        validate::hit(ray, hit);
        hit
    }

    /// Draws the mesh with the given shader, uploading it first if it changed.
    ///
    /// Empty meshes (including failed ones) draw nothing.
    ///
    /// # Errors
    /// Only if the shader fails to build, see [Shader::use_program]
    pub fn draw(&self, ctx: &mut RenderContext, shader: &mut Shader) -> Result<(), GpuError> {
        if self.is_empty() {
            return Ok(());
        }
        shader.use_program(ctx)?;
        let buffer = self.gpu.prepare(ctx, || self.vertex_bytes());
        ctx.backend().bind_vertex_layout(buffer, &self.layout);
        ctx.backend().draw_triangles(3 * self.faces.len() as u32);
        Ok(())
    }
}

// endregion Impl
