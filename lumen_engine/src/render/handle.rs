use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::core::targets::RENDER;
use crate::core::types::GpuId;
use crate::render::backend::GpuResource;

/// Resources waiting to be deleted by the backend, filled as handles are dropped
pub(crate) type ReleaseQueue = Rc<RefCell<Vec<GpuResource>>>;

/// Ownership of a single GPU resource.
///
/// Shared as `Rc<GpuHandle>`. When the last reference goes away the resource is queued for release,
/// and deleted the next time [RenderContext::collect_garbage](crate::render::context::RenderContext::collect_garbage)
/// runs, so each resource is released exactly once.
#[derive(Debug)]
pub struct GpuHandle {
    resource: GpuResource,
    queue: ReleaseQueue,
}

impl GpuHandle {
    pub(crate) fn new(resource: GpuResource, queue: ReleaseQueue) -> Self { Self { resource, queue } }

    pub fn id(&self) -> GpuId { self.resource.id() }

    pub fn resource(&self) -> GpuResource { self.resource }
}

impl Drop for GpuHandle {
    fn drop(&mut self) {
        trace!(target: RENDER, resource = ?self.resource, "queueing gpu resource for release");
        self.queue.borrow_mut().push(self.resource);
    }
}
