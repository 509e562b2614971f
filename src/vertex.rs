//! Vertex layouts.
//!
//! [`VertexFormat`] is the single table that decides buffer stride at
//! geometry creation, attribute bindings at vertex-array creation, and
//! whether draws are indexed. Offsets come from [`offset_of!`] on the
//! `#[repr(C)]` vertex structs, so reordering a struct's fields cannot put
//! the three call sites out of step.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

/// Attribute location of the vertex position.
pub const POSITION_LOCATION: u32 = 0;
/// Attribute location of the texture coordinate.
pub const UV_LOCATION: u32 = 1;
/// Attribute location of the normal.
pub const NORMAL_LOCATION: u32 = 2;
/// Attribute location of the tangent.
pub const TANGENT_LOCATION: u32 = 3;

/// Closed set of vertex layouts. Every format except [`VertexFormat::V3F32`]
/// carries a 16-bit index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexFormat {
    /// No layout; geometry creation fails.
    #[default]
    Unknown,
    /// Position only, drawn as arrays.
    V3F32,
    /// Position, indexed.
    V3F32Ui16,
    /// Position and normal, indexed.
    V3N3F32Ui16,
    /// Position and uv, indexed.
    V3T2F32Ui16,
    /// Position, uv and normal, indexed.
    V3T2N3F32Ui16,
    /// Position, uv, normal and tangent, indexed.
    V3Uv2N3T3F32Ui16,
}

/// One float attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: i32,
    /// Byte offset inside the vertex.
    pub offset: i32,
}

/// Everything the driver needs to bind an interleaved vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    /// Size of one vertex in bytes.
    pub stride: i32,
    /// Enabled attributes in location order.
    pub attributes: &'static [VertexAttribute],
}

/// Position only.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct V3 {
    /// Object-space position.
    pub position: [f32; 3],
}

/// Position and normal.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct V3N3 {
    /// Object-space position.
    pub position: [f32; 3],
    /// Unit normal.
    pub normal: [f32; 3],
}

/// Position and texture coordinate.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct V3T2 {
    /// Object-space position.
    pub position: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

/// Position, texture coordinate and normal.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct V3T2N3 {
    /// Object-space position.
    pub position: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
    /// Unit normal.
    pub normal: [f32; 3],
}

/// Position, texture coordinate, normal and tangent.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct V3Uv2N3T3 {
    /// Object-space position.
    pub position: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
    /// Unit normal.
    pub normal: [f32; 3],
    /// Unit tangent.
    pub tangent: [f32; 3],
}

/// A vertex struct that belongs to exactly one [`VertexFormat`].
pub trait Vertex: Pod {
    /// The format whose layout this struct matches.
    const FORMAT: VertexFormat;
}

impl Vertex for V3 {
    const FORMAT: VertexFormat = VertexFormat::V3F32;
}

impl Vertex for V3N3 {
    const FORMAT: VertexFormat = VertexFormat::V3N3F32Ui16;
}

impl Vertex for V3T2 {
    const FORMAT: VertexFormat = VertexFormat::V3T2F32Ui16;
}

impl Vertex for V3T2N3 {
    const FORMAT: VertexFormat = VertexFormat::V3T2N3F32Ui16;
}

impl Vertex for V3Uv2N3T3 {
    const FORMAT: VertexFormat = VertexFormat::V3Uv2N3T3F32Ui16;
}

// Vertex structs are a few dozen bytes; the casts below cannot truncate.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn attr(location: u32, components: i32, offset: usize) -> VertexAttribute {
    VertexAttribute {
        location,
        components,
        offset: offset as i32,
    }
}

const V3_ATTRIBUTES: [VertexAttribute; 1] = [attr(POSITION_LOCATION, 3, offset_of!(V3, position))];

const V3N3_ATTRIBUTES: [VertexAttribute; 2] = [
    attr(POSITION_LOCATION, 3, offset_of!(V3N3, position)),
    attr(NORMAL_LOCATION, 3, offset_of!(V3N3, normal)),
];

const V3T2_ATTRIBUTES: [VertexAttribute; 2] = [
    attr(POSITION_LOCATION, 3, offset_of!(V3T2, position)),
    attr(UV_LOCATION, 2, offset_of!(V3T2, uv)),
];

const V3T2N3_ATTRIBUTES: [VertexAttribute; 3] = [
    attr(POSITION_LOCATION, 3, offset_of!(V3T2N3, position)),
    attr(UV_LOCATION, 2, offset_of!(V3T2N3, uv)),
    attr(NORMAL_LOCATION, 3, offset_of!(V3T2N3, normal)),
];

const V3UV2N3T3_ATTRIBUTES: [VertexAttribute; 4] = [
    attr(POSITION_LOCATION, 3, offset_of!(V3Uv2N3T3, position)),
    attr(UV_LOCATION, 2, offset_of!(V3Uv2N3T3, uv)),
    attr(NORMAL_LOCATION, 3, offset_of!(V3Uv2N3T3, normal)),
    attr(TANGENT_LOCATION, 3, offset_of!(V3Uv2N3T3, tangent)),
];

impl VertexFormat {
    /// Size of one vertex in bytes, `0` for `Unknown`.
    pub fn stride(self) -> usize {
        match self {
            VertexFormat::Unknown => 0,
            VertexFormat::V3F32 | VertexFormat::V3F32Ui16 => size_of::<V3>(),
            VertexFormat::V3N3F32Ui16 => size_of::<V3N3>(),
            VertexFormat::V3T2F32Ui16 => size_of::<V3T2>(),
            VertexFormat::V3T2N3F32Ui16 => size_of::<V3T2N3>(),
            VertexFormat::V3Uv2N3T3F32Ui16 => size_of::<V3Uv2N3T3>(),
        }
    }

    /// Attribute bindings, empty for `Unknown`.
    pub fn attributes(self) -> &'static [VertexAttribute] {
        match self {
            VertexFormat::Unknown => &[],
            VertexFormat::V3F32 | VertexFormat::V3F32Ui16 => &V3_ATTRIBUTES,
            VertexFormat::V3N3F32Ui16 => &V3N3_ATTRIBUTES,
            VertexFormat::V3T2F32Ui16 => &V3T2_ATTRIBUTES,
            VertexFormat::V3T2N3F32Ui16 => &V3T2N3_ATTRIBUTES,
            VertexFormat::V3Uv2N3T3F32Ui16 => &V3UV2N3T3_ATTRIBUTES,
        }
    }

    /// Whether geometry of this format owns an index buffer and is drawn
    /// with indexed draws.
    pub fn has_indices(self) -> bool {
        !matches!(self, VertexFormat::V3F32 | VertexFormat::Unknown)
    }

    /// Full layout for vertex-array creation. `None` for `Unknown`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn layout(self) -> Option<VertexLayout> {
        if self == VertexFormat::Unknown {
            return None;
        }
        Some(VertexLayout {
            stride: self.stride() as i32,
            attributes: self.attributes(),
        })
    }
}
