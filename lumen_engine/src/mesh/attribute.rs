//! Per-vertex attribute types, and how they are laid out in a GPU vertex buffer.
//!
//! Every type that can be attached to a vertex implements [VertexAttribute], which maps it onto the
//! element type and component count the GPU sees. A mesh carries a *tuple* of these
//! (an [AttributeSet]), so the vertex shape is fixed at compile time and no dynamic dispatch is needed.

use std::fmt::Debug;

use bytemuck::Pod;
use getset::{CopyGetters, Getters};
use static_assertions::const_assert_eq;
use strum_macros::Display;
use valuable::Valuable;

use crate::core::types::{ColourRgba, IVector2, IVector3, Vector2, Vector3, Vector4};
use crate::mesh::generic::{IndexArray, MeshError};

/// Scalar type of each component of a vertex attribute, as understood by the GPU
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, Valuable)]
pub enum ElementType {
    Float,
    Int,
    UnsignedInt,
    Short,
    UnsignedShort,
    Byte,
    UnsignedByte,
}

impl ElementType {
    /// Size of a single component, in bytes
    pub const fn size(self) -> u32 {
        match self {
            Self::Float | Self::Int | Self::UnsignedInt => 4,
            Self::Short | Self::UnsignedShort => 2,
            Self::Byte | Self::UnsignedByte => 1,
        }
    }

    /// The matching OpenGL type enum (`GL_FLOAT`, `GL_INT`, ...)
    pub const fn gl_enum(self) -> u32 {
        match self {
            Self::Byte => 0x1400,
            Self::UnsignedByte => 0x1401,
            Self::Short => 0x1402,
            Self::UnsignedShort => 0x1403,
            Self::Int => 0x1404,
            Self::UnsignedInt => 0x1405,
            Self::Float => 0x1406,
        }
    }
}

/// A value that can be attached to each vertex of a mesh
pub trait VertexAttribute: Pod + Debug + PartialEq {
    const ELEMENT: ElementType;
    const COMPONENTS: u32;
    /// Size of the whole attribute, in bytes
    const SIZE: u32 = Self::ELEMENT.size() * Self::COMPONENTS;
}

/// Implements [VertexAttribute] for each type in the table, checking at compile time that the
/// type really is laid out as `components` contiguous elements
macro_rules! vertex_attributes {
    {$( $ty:ty => $element:ident * $count:literal ),* $(,)?} => {$(
        impl VertexAttribute for $ty {
            const ELEMENT: ElementType = ElementType::$element;
            const COMPONENTS: u32 = $count;
        }
        const_assert_eq!(std::mem::size_of::<$ty>(), (ElementType::$element.size() * $count) as usize);
    )*};
}

vertex_attributes! {
    f32        => Float * 1,
    Vector2    => Float * 2,
    Vector3    => Float * 3,
    Vector4    => Float * 4,
    ColourRgba => Float * 4,
    i32        => Int * 1,
    u32        => UnsignedInt * 1,
    i16        => Short * 1,
    u16        => UnsignedShort * 1,
    i8         => Byte * 1,
    u8         => UnsignedByte * 1,
    IVector2   => Int * 2,
    IVector3   => Int * 3,
}

// region Layout

/// Where a single attribute lives inside an interleaved vertex
#[derive(CopyGetters, Copy, Clone, Debug, PartialEq, Eq, Valuable)]
#[getset(get_copy = "pub")]
pub struct AttributeLayout {
    /// Shader input location
    location: u32,
    element: ElementType,
    components: u32,
    /// Byte offset from the start of the vertex
    offset: u32,
}

impl AttributeLayout {
    pub fn size(&self) -> u32 { self.element.size() * self.components }
}

/// Interleaved layout of one vertex: the position (location 0) followed by each attribute in
/// declaration order, tightly packed
#[derive(Getters, Clone, Debug, PartialEq, Eq, Valuable)]
pub struct VertexLayout {
    #[getset(get = "pub")]
    attributes: Vec<AttributeLayout>,
    stride: u32,
}

impl VertexLayout {
    /// Builds the layout for a mesh with the attribute set `A`
    pub fn of<A: AttributeSet>() -> Self {
        let position = (Vector3::ELEMENT, Vector3::COMPONENTS);
        let mut offset = 0;
        let attributes = std::iter::once(position)
            .chain(A::describe())
            .zip(0..)
            .map(|((element, components), location)| {
                let attr = AttributeLayout {
                    location,
                    element,
                    components,
                    offset,
                };
                offset += attr.size();
                attr
            })
            .collect();

        Self {
            attributes,
            stride: offset,
        }
    }

    /// Size of a single vertex, in bytes
    pub fn stride(&self) -> u32 { self.stride }
}

// endregion Layout

// region Attribute sets

/// A tuple of [VertexAttribute]s attached to every vertex of a mesh.
///
/// Implemented for tuples of up to four attributes; `()` is a mesh of bare positions.
pub trait AttributeSet: Copy + Debug + PartialEq + 'static {
    /// How many attributes are in the set
    const COUNT: usize;

    /// One slice of source values per attribute, to gather from when building faces
    type Sources<'a>: Copy;

    /// One index per attribute, selecting into [Self::Sources]
    type Indices: Copy + Debug + PartialEq + Eq + Default;

    /// `(element, components)` for each attribute, in declaration order
    fn describe() -> Vec<(ElementType, u32)>;

    /// Total size of all attributes, in bytes
    fn byte_size() -> u32;

    /// Picks one value out of each source array
    ///
    /// # Errors
    /// Returns [MeshError::IndexOutOfRange] if any index is past the end of its source array
    fn gather(sources: Self::Sources<'_>, indices: &Self::Indices) -> Result<Self, MeshError>;

    /// Appends the raw bytes of each attribute, in declaration order
    fn write_bytes(&self, out: &mut Vec<u8>);

    /// Reads back a set written by [Self::write_bytes]
    ///
    /// # Panics
    /// If `bytes` is shorter than [Self::byte_size]
    fn read_bytes(bytes: &[u8]) -> Self;
}

fn gather_one<T: VertexAttribute>(source: &[T], index: u32, attribute: usize) -> Result<T, MeshError> {
    source
        .get(index as usize)
        .copied()
        .ok_or(MeshError::IndexOutOfRange {
            array: IndexArray::Attribute(attribute),
            index,
            len: source.len(),
        })
}

fn read_one<T: VertexAttribute>(bytes: &[u8], offset: &mut usize) -> T {
    let end = *offset + T::SIZE as usize;
    let val = bytemuck::pod_read_unaligned(&bytes[*offset..end]);
    *offset = end;
    val
}

macro_rules! impl_attribute_set {
    ($count:literal; $( $name:ident : $idx:tt ),*) => {
        #[allow(unused_variables, unused_mut, clippy::unused_unit)]
        impl<$($name: VertexAttribute),*> AttributeSet for ($($name,)*) {
            const COUNT: usize = $count;
            type Sources<'a> = ($(&'a [$name],)*);
            type Indices = [u32; $count];

            fn describe() -> Vec<(ElementType, u32)> { vec![$( ($name::ELEMENT, $name::COMPONENTS) ),*] }

            fn byte_size() -> u32 { 0 $(+ $name::SIZE)* }

            fn gather(sources: Self::Sources<'_>, indices: &Self::Indices) -> Result<Self, MeshError> {
                Ok(($( gather_one(sources.$idx, indices[$idx], $idx)?, )*))
            }

            fn write_bytes(&self, out: &mut Vec<u8>) {
                $( out.extend_from_slice(bytemuck::bytes_of(&self.$idx)); )*
            }

            fn read_bytes(bytes: &[u8]) -> Self {
                let mut offset = 0;
                ($( read_one::<$name>(bytes, &mut offset), )*)
            }
        }
    };
}

impl_attribute_set!(0;);
impl_attribute_set!(1; A: 0);
impl_attribute_set!(2; A: 0, B: 1);
impl_attribute_set!(3; A: 0, B: 1, C: 2);
impl_attribute_set!(4; A: 0, B: 1, C: 2, D: 3);

// endregion Attribute sets
