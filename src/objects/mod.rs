//! Drawable primitives.
//!
//! Each primitive owns its GPU handles: created in `new`, checked with
//! `is_ready`, freed with `release`. Draws go through the shader registry,
//! so a program invalidated by a lost context is rebuilt on the next draw.

mod gpu_mesh;
mod highlight;
mod quad;
mod sphere;

pub use gpu_mesh::GpuMesh;
pub use highlight::{HighlightCube, BODY_HIGHLIGHT, SUN_HIGHLIGHT};
pub use quad::{Quad, QuadMode, SPRITE_ALPHA_CUTOFF};
pub use sphere::{Lighting, SphereBody, FALLBACK_LIGHT};
