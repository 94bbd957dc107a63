use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::core::targets::RENDER;
use crate::core::types::GpuId;
use crate::mesh::attribute::VertexLayout;
use crate::render::backend::{GpuBackend, GpuError, GpuResource, ShaderSources, UniformValue, Viewport};
use crate::render::texture::TextureFilter;

/// A single call made to a [HeadlessBackend]
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCall {
    CompileProgram(GpuId),
    UseProgram(GpuId),
    SetUniform {
        program: GpuId,
        name: String,
        value: UniformValue,
    },
    CreateBuffer(GpuId),
    UploadBuffer {
        buffer: GpuId,
        len: usize,
    },
    BindVertexLayout {
        buffer: GpuId,
        layout: VertexLayout,
    },
    DrawTriangles(u32),
    CreateTexture {
        texture: GpuId,
        width: u32,
        height: u32,
    },
    BindViewport(Viewport),
    Release(GpuResource),
}

/// Shared record of every call made to a [HeadlessBackend], in order
pub type CallLog = Rc<RefCell<Vec<GpuCall>>>;

/// A backend with no GPU behind it, which hands out ids and records every call.
///
/// Used to drive the engine without a window, and to inspect what a draw would have done.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    last_id: GpuId,
    log: CallLog,
    compile_error: Option<GpuError>,
}

impl HeadlessBackend {
    pub fn new() -> Self { Self::default() }

    /// A backend where every program fails to build with the given error
    pub fn failing(error: GpuError) -> Self {
        Self {
            compile_error: Some(error),
            ..Self::default()
        }
    }

    /// A handle to the call log, which stays readable after the backend is moved into a context
    pub fn log(&self) -> CallLog { Rc::clone(&self.log) }

    fn next_id(&mut self) -> GpuId {
        self.last_id += 1;
        self.last_id
    }

    fn record(&mut self, call: GpuCall) {
        trace!(target: RENDER, ?call, "headless gpu call");
        self.log.borrow_mut().push(call);
    }
}

impl GpuBackend for HeadlessBackend {
    fn compile_program(&mut self, _sources: &ShaderSources) -> Result<GpuId, GpuError> {
        if let Some(err) = &self.compile_error {
            return Err(err.clone());
        }
        let id = self.next_id();
        self.record(GpuCall::CompileProgram(id));
        Ok(id)
    }

    fn use_program(&mut self, program: GpuId) { self.record(GpuCall::UseProgram(program)) }

    fn set_uniform(&mut self, program: GpuId, name: &str, value: &UniformValue) {
        self.record(GpuCall::SetUniform {
            program,
            name: name.to_string(),
            value: *value,
        })
    }

    fn create_buffer(&mut self) -> GpuId {
        let id = self.next_id();
        self.record(GpuCall::CreateBuffer(id));
        id
    }

    fn upload_buffer(&mut self, buffer: GpuId, data: &[u8]) {
        self.record(GpuCall::UploadBuffer { buffer, len: data.len() })
    }

    fn bind_vertex_layout(&mut self, buffer: GpuId, layout: &VertexLayout) {
        self.record(GpuCall::BindVertexLayout {
            buffer,
            layout: layout.clone(),
        })
    }

    fn draw_triangles(&mut self, vertex_count: u32) { self.record(GpuCall::DrawTriangles(vertex_count)) }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        _pixels: &[u32],
        _min_filter: TextureFilter,
        _mag_filter: TextureFilter,
    ) -> GpuId {
        let texture = self.next_id();
        self.record(GpuCall::CreateTexture { texture, width, height });
        texture
    }

    fn bind_viewport(&mut self, viewport: Viewport) { self.record(GpuCall::BindViewport(viewport)) }

    fn release(&mut self, resource: GpuResource) { self.record(GpuCall::Release(resource)) }
}
