//! Vertex layouts.
//!
//! Meshes store interleaved `f32` vertex data; the layout decides which
//! attributes are present and where they sit in each vertex.

/// Interleaved vertex layout of a [`super::Mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    /// `position[3], texcoord[2]`.
    Textured,
    /// `position[3], normal[3], texcoord[2]`.
    Lit,
}

impl VertexLayout {
    /// Number of floats per vertex.
    #[inline]
    pub const fn floats_per_vertex(self) -> usize {
        match self {
            Self::Textured => 5,
            Self::Lit => 8,
        }
    }

    /// Byte stride of one vertex.
    #[inline]
    pub const fn stride(self) -> usize {
        self.floats_per_vertex() * std::mem::size_of::<f32>()
    }

    /// Whether vertices carry a normal.
    #[inline]
    pub const fn has_normals(self) -> bool {
        matches!(self, Self::Lit)
    }

    /// Float offset of the texture coordinate inside one vertex.
    #[inline]
    pub const fn texcoord_offset(self) -> usize {
        match self {
            Self::Textured => 3,
            Self::Lit => 6,
        }
    }

    /// Get the wgpu vertex buffer layout for this vertex type.
    pub fn wgpu_layout(self) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: match self {
                Self::Textured => &TEXTURED_ATTRIBUTES,
                Self::Lit => &LIT_ATTRIBUTES,
            },
        }
    }
}

const TEXTURED_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
    // position
    wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    },
    // texcoord
    wgpu::VertexAttribute {
        offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        shader_location: 2,
        format: wgpu::VertexFormat::Float32x2,
    },
];

const LIT_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    // position
    wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    },
    // normal
    wgpu::VertexAttribute {
        offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x3,
    },
    // texcoord
    wgpu::VertexAttribute {
        offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
        shader_location: 2,
        format: wgpu::VertexFormat::Float32x2,
    },
];
