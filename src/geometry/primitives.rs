//! Primitive geometry builders.

use super::{Mesh, VertexLayout};

/// A quad spanning `[-1, 1]` in the XY plane with corner texture coordinates.
/// Texture V grows downwards so images appear upright.
pub fn unit_quad() -> Mesh {
    #[rustfmt::skip]
    let vertices = vec![
        // position        texcoord
        -1.0,  1.0, 0.0,   0.0, 0.0, // Top-left
        -1.0, -1.0, 0.0,   0.0, 1.0, // Bottom-left
         1.0, -1.0, 0.0,   1.0, 1.0, // Bottom-right
         1.0,  1.0, 0.0,   1.0, 0.0, // Top-right
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];

    Mesh::from_parts(vertices, indices, VertexLayout::Textured)
}

/// A cube spanning `[-0.5, 0.5]` on every axis. Texture coordinates are zero;
/// the cube is meant to be drawn with a flat tint.
pub fn unit_cube() -> Mesh {
    let s = 0.5;
    let corners = [
        [-s, -s, -s],
        [s, -s, -s],
        [s, s, -s],
        [-s, s, -s],
        [-s, -s, s],
        [s, -s, s],
        [s, s, s],
        [-s, s, s],
    ];

    let mut vertices = Vec::with_capacity(corners.len() * VertexLayout::Textured.floats_per_vertex());
    for corner in corners {
        vertices.extend_from_slice(&corner);
        vertices.extend_from_slice(&[0.0, 0.0]);
    }

    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2, 0, 2, 3, // back
        4, 5, 6, 4, 6, 7, // front
        0, 4, 7, 0, 7, 3, // left
        1, 5, 6, 1, 6, 2, // right
        3, 2, 6, 3, 6, 7, // top
        0, 1, 5, 0, 5, 4, // bottom
    ];

    Mesh::from_parts(vertices, indices, VertexLayout::Textured)
}
