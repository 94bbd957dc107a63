use strum_macros::Display;
use thiserror::Error;
use valuable::Valuable;

use crate::core::types::{GpuId, Matrix4, Vector2, Vector3, Vector4};
use crate::mesh::attribute::VertexLayout;
use crate::render::texture::TextureFilter;

/// The graphics API, as seen by the engine.
///
/// Implementations own the actual API objects; the engine only ever refers to them by [GpuId].
pub trait GpuBackend {
    /// Compiles and links a program from its stage sources
    ///
    /// # Errors
    /// Compile and link failures are fatal, see [GpuError]
    fn compile_program(&mut self, sources: &ShaderSources) -> Result<GpuId, GpuError>;

    fn use_program(&mut self, program: GpuId);

    /// Sets a named uniform on the given program. Unknown names are ignored
    fn set_uniform(&mut self, program: GpuId, name: &str, value: &UniformValue);

    fn create_buffer(&mut self) -> GpuId;

    /// Replaces the whole contents of the buffer
    fn upload_buffer(&mut self, buffer: GpuId, data: &[u8]);

    /// Binds the buffer as the vertex source, described by `layout`
    fn bind_vertex_layout(&mut self, buffer: GpuId, layout: &VertexLayout);

    fn draw_triangles(&mut self, vertex_count: u32);

    /// Creates a texture from packed RGBA pixels, row by row
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u32],
        min_filter: TextureFilter,
        mag_filter: TextureFilter,
    ) -> GpuId;

    fn bind_viewport(&mut self, viewport: Viewport);

    /// Deletes the resource. Called exactly once per resource
    fn release(&mut self, resource: GpuResource);
}

/// Any object owned by the backend
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, Valuable)]
pub enum GpuResource {
    Program(GpuId),
    Buffer(GpuId),
    Texture(GpuId),
}

impl GpuResource {
    pub fn id(&self) -> GpuId {
        match *self {
            Self::Program(id) | Self::Buffer(id) | Self::Texture(id) => id,
        }
    }
}

/// A rectangular region of the render target, in pixels
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Valuable)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self { Self { x, y, width, height } }

    pub fn aspect_ratio(&self) -> f32 { self.width as f32 / self.height as f32 }
}

/// Source text for each stage of a shader program
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
    pub geometry: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, Valuable)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

/// A value that can be bound to a named shader uniform
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Double(f64),
    Vec2(Vector2),
    Vec3(Vector3),
    Vec4(Vector4),
    Mat4(Matrix4),
    /// A texture, bound to the given texture unit
    Texture { unit: u32, texture: GpuId },
}

macro_rules! uniform_from {
    {$( $ty:ty => $variant:ident ),* $(,)?} => {$(
        impl From<$ty> for UniformValue {
            fn from(val: $ty) -> Self { Self::$variant(val) }
        }
    )*};
}

uniform_from! {
    i32 => Int,
    f32 => Float,
    f64 => Double,
    Vector2 => Vec2,
    Vector3 => Vec3,
    Vector4 => Vec4,
    Matrix4 => Mat4,
}

/// Errors from the GPU that the engine can't recover from.
///
/// Unlike a missing mesh or texture file (which just leaves an empty resource), a shader that doesn't
/// build means nothing can be drawn, so callers are expected to abort.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum GpuError {
    #[error("failed compiling {stage} shader: {log}")]
    CompileFailed { stage: ShaderStage, log: String },
    #[error("failed linking shader program: {log}")]
    LinkFailed { log: String },
}
