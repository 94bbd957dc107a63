//! # Module [crate::mesh]
//!
//! Triangle meshes with a compile-time vertex shape.
//!
//! - [attribute]: the types that can be attached to a vertex, and the GPU layout they produce
//! - [face]: resolved faces, and the indices they are built from
//! - [generic]: the [Mesh] itself; construction, picking and drawing
//! - [obj]: loading from OBJ files
//! - [cache]: the on-disk cache of parsed geometry

pub mod attribute;
pub mod cache;
pub mod face;
pub mod generic;
pub mod obj;

pub use generic::{Mesh, MeshError, MeshStatus};
pub use obj::UvMesh;
