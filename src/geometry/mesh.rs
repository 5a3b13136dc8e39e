//! CPU-side mesh data.

use super::VertexLayout;
use crate::math::Vector3;

/// Interleaved vertex data plus a triangle list of 16-bit indices.
///
/// Meshes are generated once and never mutated; every index is below
/// [`Mesh::vertex_count`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<f32>,
    indices: Vec<u16>,
    layout: VertexLayout,
}

impl Mesh {
    /// Build a mesh from raw interleaved data.
    pub(crate) fn from_parts(vertices: Vec<f32>, indices: Vec<u16>, layout: VertexLayout) -> Self {
        debug_assert_eq!(vertices.len() % layout.floats_per_vertex(), 0);
        Self {
            vertices,
            indices,
            layout,
        }
    }

    /// Interleaved vertex floats.
    #[inline]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Triangle list indices.
    #[inline]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Vertex layout.
    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.floats_per_vertex()
    }

    /// Number of indices.
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Position of vertex `i`.
    pub fn position(&self, i: usize) -> Vector3 {
        let base = i * self.layout.floats_per_vertex();
        Vector3::new(self.vertices[base], self.vertices[base + 1], self.vertices[base + 2])
    }

    /// Normal of vertex `i`, if the layout carries normals.
    pub fn normal(&self, i: usize) -> Option<Vector3> {
        if !self.layout.has_normals() {
            return None;
        }
        let base = i * self.layout.floats_per_vertex() + 3;
        Some(Vector3::new(self.vertices[base], self.vertices[base + 1], self.vertices[base + 2]))
    }

    /// Texture coordinate of vertex `i`.
    pub fn texcoord(&self, i: usize) -> [f32; 2] {
        let base = i * self.layout.floats_per_vertex() + self.layout.texcoord_offset();
        [self.vertices[base], self.vertices[base + 1]]
    }
}
