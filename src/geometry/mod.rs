//! Geometry module for vertex data and primitives.

mod mesh;
mod primitives;
mod sphere_geometry;
mod vertex;

pub use mesh::Mesh;
pub use primitives::{unit_cube, unit_quad};
pub use sphere_geometry::{generate_sphere, sphere_vertex_count, SphereGeometry, MAX_SPHERE_VERTICES};
pub use vertex::VertexLayout;
