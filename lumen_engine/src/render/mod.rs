//! # Module [crate::render]
//!
//! The boundary between the engine and the GPU.
//!
//! Nothing in here talks to a graphics API directly: all calls go through a [backend::GpuBackend],
//! reached via the [context::RenderContext] that is passed explicitly to every draw.
//! GPU objects are owned through reference-counted [handle::GpuHandle]s, which are queued for release
//! once the last reference is dropped.

pub mod backend;
pub mod bitmap;
pub mod context;
pub mod handle;
pub mod headless;
pub mod shader;
pub mod texture;
