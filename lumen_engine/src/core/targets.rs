//! Log targets for each subsystem of the engine

use crate::tracing_targets;

tracing_targets! {
    MAIN = "main",
    /// Mesh construction, OBJ parsing and uploads
    MESH = "mesh",
    /// The on-disk geometry cache
    CACHE = "cache",
    OBJECT = "object",
    CAMERA = "camera",
    /// GPU resources, shaders and textures
    RENDER = "render",
}
