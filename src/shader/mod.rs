//! Shader programs.
//!
//! There are two programs: [`ShaderVariant::Flat`] samples a texture and
//! multiplies by a tint, [`ShaderVariant::Phong`] adds per-fragment diffuse
//! and specular lighting. Both share the same uniform block and texture
//! bindings, so attribute and uniform locations are fixed per variant.

mod registry;

pub use registry::ShaderRegistry;

use crate::core::DrawUniforms;
use crate::geometry::VertexLayout;
use std::fmt;
use std::mem::offset_of;
use thiserror::Error;

/// Errors produced while building a program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// A shader stage failed to compile.
    #[error("{variant} shader failed to compile: {log}")]
    Compile {
        /// Variant being compiled.
        variant: ShaderVariant,
        /// Compiler output.
        log: String,
    },

    /// The stages compiled but the program failed to link.
    #[error("{variant} program failed to link: {log}")]
    Link {
        /// Variant being linked.
        variant: ShaderVariant,
        /// Linker output.
        log: String,
    },

    /// The device was lost before compilation.
    #[error("Graphics context lost")]
    ContextLost,
}

/// Vertex attribute locations used by a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLocations {
    /// Position (`vec3`).
    pub position: u32,
    /// Normal (`vec3`), if the program is lit.
    pub normal: Option<u32>,
    /// Texture coordinate (`vec2`).
    pub texcoord: u32,
}

/// Byte offsets of the uniforms a program reads from [`DrawUniforms`], plus
/// the bind group holding its texture and sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocations {
    /// Model-view-projection matrix.
    pub mvp: usize,
    /// Object-space light position.
    pub light_position: Option<usize>,
    /// Object-space eye position.
    pub eye_position: Option<usize>,
    /// Tint color.
    pub tint: usize,
    /// Alpha cutoff and spare parameters.
    pub params: usize,
    /// Bind group index of the texture and sampler.
    pub texture_group: u32,
}

/// The programs the renderer knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderVariant {
    /// Unlit, textured.
    Flat,
    /// Phong lit, textured.
    Phong,
}

impl ShaderVariant {
    /// Every variant.
    pub const ALL: [Self; 2] = [Self::Flat, Self::Phong];

    /// Number of variants.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index, for per-variant tables.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Flat => 0,
            Self::Phong => 1,
        }
    }

    /// Debug label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flat => "Flat Shader",
            Self::Phong => "Phong Shader",
        }
    }

    /// WGSL source.
    pub const fn source(self) -> &'static str {
        match self {
            Self::Flat => include_str!("../shaders/flat.wgsl"),
            Self::Phong => include_str!("../shaders/phong.wgsl"),
        }
    }

    /// Vertex layout the program consumes.
    #[inline]
    pub const fn vertex_layout(self) -> VertexLayout {
        match self {
            Self::Flat => VertexLayout::Textured,
            Self::Phong => VertexLayout::Lit,
        }
    }

    /// Attribute locations.
    pub const fn attribute_locations(self) -> AttributeLocations {
        match self {
            Self::Flat => AttributeLocations {
                position: 0,
                normal: None,
                texcoord: 2,
            },
            Self::Phong => AttributeLocations {
                position: 0,
                normal: Some(1),
                texcoord: 2,
            },
        }
    }

    /// Uniform locations.
    pub const fn uniform_locations(self) -> UniformLocations {
        let lit = matches!(self, Self::Phong);
        UniformLocations {
            mvp: offset_of!(DrawUniforms, mvp),
            light_position: if lit {
                Some(offset_of!(DrawUniforms, light_position))
            } else {
                None
            },
            eye_position: if lit {
                Some(offset_of!(DrawUniforms, eye_position))
            } else {
                None
            },
            tint: offset_of!(DrawUniforms, tint),
            params: offset_of!(DrawUniforms, params),
            texture_group: 1,
        }
    }
}

impl fmt::Display for ShaderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flat => "flat",
            Self::Phong => "phong",
        })
    }
}
