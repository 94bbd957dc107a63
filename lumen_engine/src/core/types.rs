use crate::core::colour::Colour;

/// Numeric type used for graphics calculations in the engine
pub type Channel = f32;
pub type ColourRgba = Colour<4>;

/// Numeric type used for most calculations in the engine.
///
/// Everything that ends up in a vertex buffer is single precision, so the maths is too
pub type Number = f32;
pub type Vector2 = glam::Vec2;
pub type Vector3 = glam::Vec3;
pub type Vector4 = glam::Vec4;
pub type IVector2 = glam::IVec2;
pub type IVector3 = glam::IVec3;
pub use crate::core::matrix::Matrix4;

/// Numeric identifier the GPU backend hands out for programs, buffers and textures
pub type GpuId = u32;
