use crate::core::types::Vector3;
use crate::mesh::attribute::AttributeSet;
use crate::shared::intersect::Hit;
use crate::shared::ray::Ray;

/// A single corner of a face: its position plus the attached attributes
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex<A: AttributeSet> {
    pub position: Vector3,
    pub attrs: A,
}

/// A triangle, with fully resolved vertex data for each corner
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Face<A: AttributeSet> {
    pub vertices: [Vertex<A>; 3],
}

impl<A: AttributeSet> Face<A> {
    pub fn positions(&self) -> [Vector3; 3] { self.vertices.map(|v| v.position) }

    /// See [Ray::intersect_triangle]; the winding of the vertices decides which side is the front
    pub fn intersect(&self, ray: &Ray) -> Hit {
        let [a, b, c] = self.positions();
        ray.intersect_triangle(a, b, c)
    }

    /// Size of one face in an interleaved buffer, in bytes
    pub fn byte_size() -> usize { 3 * (std::mem::size_of::<Vector3>() + A::byte_size() as usize) }

    /// Appends the three interleaved vertices
    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        for vertex in &self.vertices {
            out.extend_from_slice(bytemuck::bytes_of(&vertex.position));
            vertex.attrs.write_bytes(out);
        }
    }

    /// Reads back a face written by [Self::write_bytes]
    ///
    /// # Panics
    /// If `bytes` is shorter than [Self::byte_size]
    pub fn read_bytes(bytes: &[u8]) -> Self {
        let pos_size = std::mem::size_of::<Vector3>();
        let vertex_size = pos_size + A::byte_size() as usize;
        let vertices = [0, 1, 2].map(|i| {
            let vertex = &bytes[i * vertex_size..(i + 1) * vertex_size];
            Vertex {
                position: bytemuck::pod_read_unaligned(&vertex[..pos_size]),
                attrs: A::read_bytes(&vertex[pos_size..]),
            }
        });
        Self { vertices }
    }
}

/// Indices for a single corner: one into the position array, and one per attribute source
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CornerIndices<A: AttributeSet> {
    pub position: u32,
    pub attrs: A::Indices,
}

impl<A: AttributeSet> CornerIndices<A> {
    pub fn new(position: u32, attrs: A::Indices) -> Self { Self { position, attrs } }
}

/// Indices describing one face, before the vertex data is gathered
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceIndices<A: AttributeSet> {
    pub corners: [CornerIndices<A>; 3],
}

impl<A: AttributeSet> FaceIndices<A> {
    pub fn new(corners: [CornerIndices<A>; 3]) -> Self { Self { corners } }
}
