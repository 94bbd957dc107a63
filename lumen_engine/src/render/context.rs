use std::cell::RefCell;
use std::rc::Rc;

use derivative::Derivative;
use getset::CopyGetters;
use tracing::{debug, trace};

use crate::core::targets::RENDER;
use crate::core::types::GpuId;
use crate::render::backend::{GpuBackend, GpuResource, Viewport};
use crate::render::handle::{GpuHandle, ReleaseQueue};
use crate::render::texture::TextureFilter;

/// Everything a draw call needs to know about the current GPU state.
///
/// Passed explicitly into every draw, instead of keeping the bound program and viewport in globals.
#[derive(Derivative, CopyGetters)]
#[derivative(Debug)]
pub struct RenderContext {
    #[derivative(Debug = "ignore")]
    backend: Box<dyn GpuBackend>,
    /// The program last passed to [Self::use_program]
    #[getset(get_copy = "pub")]
    current_program: Option<GpuId>,
    /// The viewport last passed to [Self::bind_viewport]
    #[getset(get_copy = "pub")]
    active_viewport: Option<Viewport>,
    release_queue: ReleaseQueue,
}

impl RenderContext {
    pub fn new(backend: impl GpuBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            current_program: None,
            active_viewport: None,
            release_queue: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn backend(&mut self) -> &mut dyn GpuBackend { self.backend.as_mut() }

    pub fn use_program(&mut self, program: GpuId) {
        self.backend.use_program(program);
        self.current_program = Some(program);
    }

    pub fn bind_viewport(&mut self, viewport: Viewport) {
        self.backend.bind_viewport(viewport);
        self.active_viewport = Some(viewport);
    }

    /// Takes ownership of a resource that was created directly through the backend
    pub fn adopt(&self, resource: GpuResource) -> Rc<GpuHandle> {
        Rc::new(GpuHandle::new(resource, Rc::clone(&self.release_queue)))
    }

    pub fn create_buffer(&mut self) -> Rc<GpuHandle> {
        let id = self.backend.create_buffer();
        trace!(target: RENDER, id, "created buffer");
        self.adopt(GpuResource::Buffer(id))
    }

    pub fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u32],
        min_filter: TextureFilter,
        mag_filter: TextureFilter,
    ) -> Rc<GpuHandle> {
        let id = self
            .backend
            .create_texture(width, height, pixels, min_filter, mag_filter);
        trace!(target: RENDER, id, width, height, "created texture");
        self.adopt(GpuResource::Texture(id))
    }

    /// How many resources are waiting for [Self::collect_garbage]
    pub fn pending_releases(&self) -> usize { self.release_queue.borrow().len() }

    /// Releases every resource whose last handle has been dropped. Call this at frame boundaries.
    ///
    /// Returns how many resources were released.
    pub fn collect_garbage(&mut self) -> usize {
        let released = std::mem::take(&mut *self.release_queue.borrow_mut());
        for &resource in &released {
            if let GpuResource::Program(id) = resource {
                if self.current_program == Some(id) {
                    self.current_program = None;
                }
            }
            self.backend.release(resource);
        }
        if !released.is_empty() {
            debug!(target: RENDER, count = released.len(), "released gpu resources");
        }
        released.len()
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) { self.collect_garbage(); }
}
