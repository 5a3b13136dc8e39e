//! Sphere geometry.

use super::{Mesh, VertexLayout};
use std::f32::consts::{FRAC_PI_2, PI};

/// Most vertices a sphere may have while its indices still fit in `u16`.
pub const MAX_SPHERE_VERTICES: u64 = u16::MAX as u64 + 1;

/// Vertex count of a `stacks` x `slices` sphere, seam and pole rings included.
#[inline]
pub fn sphere_vertex_count(stacks: u32, slices: u32) -> u64 {
    (stacks as u64 + 1) * (slices as u64 + 1)
}

/// A latitude/longitude sphere description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometry {
    /// Radius.
    pub radius: f32,
    /// Latitude bands (rings - 1).
    pub stacks: u32,
    /// Longitude segments per ring.
    pub slices: u32,
}

impl Default for SphereGeometry {
    fn default() -> Self {
        Self::new(1.0, 48, 48)
    }
}

impl SphereGeometry {
    /// Create a new sphere geometry.
    ///
    /// Zero tessellation counts are raised to 1. Counts whose vertex total
    /// exceeds [`MAX_SPHERE_VERTICES`] are lowered, the larger one first,
    /// until the mesh fits `u16` indices.
    pub fn new(radius: f32, stacks: u32, slices: u32) -> Self {
        let (stacks, slices) = fit_u16_indices(stacks.max(1), slices.max(1));
        Self {
            radius,
            stacks,
            slices,
        }
    }

    /// Build the interleaved mesh.
    ///
    /// Rings run from the north pole (+90°) to the south pole (-90°). Each ring
    /// has `slices + 1` samples so the texture seam is duplicated, and the pole
    /// rings are full rings at a single coordinate, which leaves some
    /// zero-area triangles at the poles.
    pub fn build(&self, include_normals: bool) -> Mesh {
        let stacks = self.stacks as usize;
        let slices = self.slices as usize;
        let ring = slices + 1;
        let vertex_count = (stacks + 1) * ring;

        let layout = if include_normals {
            VertexLayout::Lit
        } else {
            VertexLayout::Textured
        };

        let mut vertices = Vec::with_capacity(vertex_count * layout.floats_per_vertex());
        let mut indices = Vec::with_capacity(stacks * slices * 6);

        for i in 0..=stacks {
            let lat = FRAC_PI_2 - i as f32 * PI / stacks as f32;
            let (sin_lat, cos_lat) = lat.sin_cos();

            for j in 0..=slices {
                let lon = 2.0 * PI * j as f32 / slices as f32;
                let (sin_lon, cos_lon) = lon.sin_cos();

                // Unit sphere point; the normal is this point since the sphere is centered.
                let nx = cos_lon * cos_lat;
                let ny = sin_lat;
                let nz = sin_lon * cos_lat;

                vertices.extend_from_slice(&[nx * self.radius, ny * self.radius, nz * self.radius]);

                if include_normals {
                    let len = (nx * nx + ny * ny + nz * nz).sqrt();
                    if len > 0.0 {
                        vertices.extend_from_slice(&[nx / len, ny / len, nz / len]);
                    } else {
                        vertices.extend_from_slice(&[0.0, 1.0, 0.0]);
                    }
                }

                vertices.push(j as f32 / slices as f32);
                vertices.push(i as f32 / stacks as f32);
            }
        }

        for i in 0..stacks {
            for j in 0..slices {
                let first = (i * ring + j) as u16;
                let second = ((i + 1) * ring + j) as u16;

                // Counter-clockwise when seen from outside.
                indices.extend_from_slice(&[first, first + 1, second]);
                indices.extend_from_slice(&[second, first + 1, second + 1]);
            }
        }

        Mesh::from_parts(vertices, indices, layout)
    }
}

fn fit_u16_indices(stacks: u32, slices: u32) -> (u32, u32) {
    // The other count is at least 1, so neither may exceed half the limit.
    let cap = (MAX_SPHERE_VERTICES / 2 - 1) as u32;
    let (mut s, mut l) = (stacks.min(cap), slices.min(cap));
    while sphere_vertex_count(s, l) > MAX_SPHERE_VERTICES {
        if s >= l {
            s -= 1;
        } else {
            l -= 1;
        }
    }
    if (s, l) != (stacks, slices) {
        log::warn!("Sphere {}x{} is too dense for u16 indices, using {}x{}", stacks, slices, s, l);
    }
    (s, l)
}

/// Generate a sphere mesh of `radius` with `stacks` latitude bands and
/// `slices` longitude segments.
pub fn generate_sphere(radius: f32, stacks: u32, slices: u32, include_normals: bool) -> Mesh {
    SphereGeometry::new(radius, stacks, slices).build(include_normals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    #[test]
    fn test_dense_request_is_lowered_to_fit_u16() {
        let geometry = SphereGeometry::new(1.0, 300, 300);
        assert!(sphere_vertex_count(geometry.stacks, geometry.slices) <= MAX_SPHERE_VERTICES);
        assert!(geometry.stacks >= 250 && geometry.slices >= 250);

        let mesh = geometry.build(true);
        assert!(mesh.vertex_count() as u64 <= MAX_SPHERE_VERTICES);
        assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
        // The last quad's far corner is the last vertex; a wrapped index would miss it.
        assert_eq!(*mesh.indices().last().unwrap() as usize, mesh.vertex_count() - 1);
    }

    #[test]
    fn test_degenerate_and_lopsided_counts() {
        let geometry = SphereGeometry::new(1.0, 0, u32::MAX);
        assert_eq!(geometry.stacks, 1);
        assert_eq!(geometry.slices, 32767);
        assert_eq!(sphere_vertex_count(geometry.stacks, geometry.slices), MAX_SPHERE_VERTICES);

        // The exact limit is accepted untouched.
        let geometry = SphereGeometry::new(1.0, 255, 255);
        assert_eq!((geometry.stacks, geometry.slices), (255, 255));
    }

    #[test]
    fn test_counts_and_index_bounds() {
        for &(stacks, slices) in &[(1, 1), (2, 3), (7, 5), (48, 48)] {
            let mesh = generate_sphere(2.5, stacks, slices, false);
            let s = stacks as usize;
            let t = slices as usize;
            assert_eq!(mesh.vertex_count(), (s + 1) * (t + 1));
            assert_eq!(mesh.index_count(), 6 * s * t);
            assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
        }
    }

    #[test]
    fn test_normals_are_unit_and_match_positions() {
        let radius = 3.0;
        let mesh = generate_sphere(radius, 12, 16, true);
        assert_eq!(mesh.layout(), VertexLayout::Lit);
        for i in 0..mesh.vertex_count() {
            let n = mesh.normal(i).expect("lit mesh has normals");
            assert!((n.length() - 1.0).abs() < 1e-5);
            let p = mesh.position(i);
            assert!(n.approx_eq(&p.normalized(), 1e-5));
            assert!((p.length() - radius).abs() < 1e-4);
        }
    }

    #[test]
    fn test_textured_mesh_has_no_normals() {
        let mesh = generate_sphere(1.0, 4, 4, false);
        assert_eq!(mesh.layout(), VertexLayout::Textured);
        assert!(mesh.normal(0).is_none());
    }

    #[test]
    fn test_poles_and_texcoords() {
        let mesh = generate_sphere(1.0, 4, 8, false);
        // First ring is the north pole, last ring the south pole.
        assert!(mesh.position(0).approx_eq(&Vector3::UNIT_Y, 1e-5));
        assert!(mesh.position(mesh.vertex_count() - 1).approx_eq(&-Vector3::UNIT_Y, 1e-5));
        // Seam duplicated: first and last sample of a ring share a position.
        let ring = 9;
        assert!(mesh.position(2 * ring).approx_eq(&mesh.position(2 * ring + 8), 1e-5));
        assert_eq!(mesh.texcoord(0), [0.0, 0.0]);
        assert_eq!(mesh.texcoord(mesh.vertex_count() - 1), [1.0, 1.0]);
    }

    #[test]
    fn test_winding_faces_outward() {
        let mesh = generate_sphere(1.0, 10, 12, false);
        for tri in mesh.indices().chunks(3) {
            let a = mesh.position(tri[0] as usize);
            let b = mesh.position(tri[1] as usize);
            let c = mesh.position(tri[2] as usize);
            let normal = (b - a).cross(&(c - a));
            if normal.length() < 1e-6 {
                continue; // degenerate pole triangle
            }
            let centroid = (a + b + c) * (1.0 / 3.0);
            assert!(normal.dot(&centroid) > 0.0);
        }
    }
}
