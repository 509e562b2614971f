//! Built-in meshes.

use crate::types::CreateGeometryInfo;
use crate::vertex::{V3T2, V3T2N3};

const fn v(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> V3T2N3 {
    V3T2N3 {
        position,
        uv,
        normal,
    }
}

/// Unit cube spanning `[-1, 1]` on every axis, four vertices per face so
/// each face has its own normal and full `[0, 1]` texture coordinates.
pub const CUBE_VERTICES: [V3T2N3; 24] = [
    // front
    v([-1.0, 1.0, 1.0], [0.0, 1.0], [0.0, 0.0, 1.0]),
    v([1.0, 1.0, 1.0], [1.0, 1.0], [0.0, 0.0, 1.0]),
    v([1.0, -1.0, 1.0], [1.0, 0.0], [0.0, 0.0, 1.0]),
    v([-1.0, -1.0, 1.0], [0.0, 0.0], [0.0, 0.0, 1.0]),
    // back
    v([1.0, 1.0, -1.0], [0.0, 1.0], [0.0, 0.0, -1.0]),
    v([-1.0, 1.0, -1.0], [1.0, 1.0], [0.0, 0.0, -1.0]),
    v([-1.0, -1.0, -1.0], [1.0, 0.0], [0.0, 0.0, -1.0]),
    v([1.0, -1.0, -1.0], [0.0, 0.0], [0.0, 0.0, -1.0]),
    // top
    v([-1.0, 1.0, -1.0], [0.0, 1.0], [0.0, 1.0, 0.0]),
    v([1.0, 1.0, -1.0], [1.0, 1.0], [0.0, 1.0, 0.0]),
    v([1.0, 1.0, 1.0], [1.0, 0.0], [0.0, 1.0, 0.0]),
    v([-1.0, 1.0, 1.0], [0.0, 0.0], [0.0, 1.0, 0.0]),
    // bottom
    v([1.0, -1.0, -1.0], [0.0, 1.0], [0.0, -1.0, 0.0]),
    v([-1.0, -1.0, -1.0], [1.0, 1.0], [0.0, -1.0, 0.0]),
    v([-1.0, -1.0, 1.0], [1.0, 0.0], [0.0, -1.0, 0.0]),
    v([1.0, -1.0, 1.0], [0.0, 0.0], [0.0, -1.0, 0.0]),
    // left
    v([-1.0, 1.0, -1.0], [0.0, 1.0], [-1.0, 0.0, 0.0]),
    v([-1.0, 1.0, 1.0], [1.0, 1.0], [-1.0, 0.0, 0.0]),
    v([-1.0, -1.0, 1.0], [1.0, 0.0], [-1.0, 0.0, 0.0]),
    v([-1.0, -1.0, -1.0], [0.0, 0.0], [-1.0, 0.0, 0.0]),
    // right
    v([1.0, 1.0, 1.0], [0.0, 1.0], [1.0, 0.0, 0.0]),
    v([1.0, 1.0, -1.0], [1.0, 1.0], [1.0, 0.0, 0.0]),
    v([1.0, -1.0, -1.0], [1.0, 0.0], [1.0, 0.0, 0.0]),
    v([1.0, -1.0, 1.0], [0.0, 0.0], [1.0, 0.0, 0.0]),
];

/// Two counter-clockwise triangles per face.
pub const CUBE_INDICES: [u16; 36] = [
    0, 3, 1, 1, 3, 2, // front
    4, 7, 5, 5, 7, 6, // back
    8, 11, 9, 9, 11, 10, // top
    12, 15, 13, 13, 15, 14, // bottom
    16, 19, 17, 17, 19, 18, // left
    20, 23, 21, 21, 23, 22, // right
];

/// Full-screen quad in normalized device coordinates.
pub const QUAD_VERTICES: [V3T2; 4] = [
    V3T2 {
        position: [-1.0, -1.0, 0.0],
        uv: [0.0, 0.0],
    },
    V3T2 {
        position: [1.0, -1.0, 0.0],
        uv: [1.0, 0.0],
    },
    V3T2 {
        position: [-1.0, 1.0, 0.0],
        uv: [0.0, 1.0],
    },
    V3T2 {
        position: [1.0, 1.0, 0.0],
        uv: [1.0, 1.0],
    },
];

/// Two triangles covering [`QUAD_VERTICES`].
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 1, 3, 2];

/// The cube as a `V3T2N3F32Ui16` geometry description.
pub fn cube() -> CreateGeometryInfo {
    CreateGeometryInfo::from_vertices(&CUBE_VERTICES, &CUBE_INDICES)
}

/// The screen quad as a `V3T2F32Ui16` geometry description.
pub fn quad() -> CreateGeometryInfo {
    CreateGeometryInfo::from_vertices(&QUAD_VERTICES, &QUAD_INDICES)
}
