//! Resource descriptors and the create-info records that configure them.
//!
//! A descriptor is an integer driver handle plus metadata captured at
//! creation. Commands copy the handle; they never hold the descriptor.

use crate::format::PixelFormat;
use crate::vertex::{Vertex, VertexFormat};

/// Handle value meaning "no framebuffer" (the default framebuffer is `0`).
pub const INVALID_FRAMEBUFFER: u32 = u32::MAX;

/// A 2D texture or 2D texture array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Texture {
    /// Driver handle, `0` when not created.
    pub id: u32,
    /// `TEXTURE_2D` or `TEXTURE_2D_ARRAY`.
    pub target: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Layer count for arrays, `0` for plain 2D textures.
    pub depth: u32,
}

impl Texture {
    /// Whether the texture has been created and not destroyed.
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Sampling quality applied at texture creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFiltering {
    /// Leave driver defaults untouched.
    None,
    /// Linear sampling, no mip blending.
    Bilinear,
    #[default]
    /// Linear sampling blended between mip levels.
    Trilinear,
    /// Trilinear plus 16x anisotropy.
    Anisotropic,
}

/// Options for [`create_texture`](crate::create_texture).
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTextureInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Layout of `pixels` and of the storage.
    pub format: PixelFormat,
    /// Generate the mip chain after upload.
    pub mipmaps: bool,
    /// Allocated mip levels.
    pub levels: u32,
    /// Sampling quality.
    pub filter: TextureFiltering,
    /// Initial contents; empty leaves storage uninitialised.
    pub pixels: Vec<u8>,
}

impl Default for CreateTextureInfo {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            format: PixelFormat::Unknown,
            mipmaps: true,
            levels: 4,
            filter: TextureFiltering::Trilinear,
            pixels: Vec::new(),
        }
    }
}

/// Options for [`create_texture_array`](crate::create_texture_array). One
/// pixel buffer per layer; `depth` layers are allocated.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTextureArrayInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Layers to allocate; grown to `layers.len()` if smaller.
    pub depth: u32,
    /// Layout of every layer.
    pub format: PixelFormat,
    /// Generate the mip chain after upload.
    pub mipmaps: bool,
    /// Allocated mip levels.
    pub levels: u32,
    /// Sampling quality.
    pub filter: TextureFiltering,
    /// Initial contents, one buffer per layer.
    pub layers: Vec<Vec<u8>>,
}

impl Default for CreateTextureArrayInfo {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            depth: 0,
            format: PixelFormat::Unknown,
            mipmaps: true,
            levels: 4,
            filter: TextureFiltering::Trilinear,
            layers: Vec::new(),
        }
    }
}

/// A GPU buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buffer {
    /// Driver handle, `0` when not created.
    pub id: u32,
    /// Allocated size in bytes.
    pub size: usize,
}

impl Buffer {
    /// Whether the buffer has been created and not destroyed.
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Binding point a buffer is attached to by
/// [`BindBufferCommand`](crate::BindBufferCommand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferType {
    /// Vertex attributes.
    Vertex,
    /// 16-bit element indices.
    Index,
    #[default]
    /// Uniform block storage.
    Uniform,
    /// Shader storage block.
    ShaderStorage,
}

impl BufferType {
    /// GL binding target.
    pub fn target(self) -> u32 {
        match self {
            BufferType::Vertex => glow::ARRAY_BUFFER,
            BufferType::Index => glow::ELEMENT_ARRAY_BUFFER,
            BufferType::Uniform => glow::UNIFORM_BUFFER,
            BufferType::ShaderStorage => glow::SHADER_STORAGE_BUFFER,
        }
    }
}

/// Options for [`create_buffer`](crate::create_buffer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBufferInfo {
    /// Size in bytes; grown to `data.len()` if smaller.
    pub size: usize,
    /// GL usage hint.
    pub usage: u32,
    /// Initial contents, may be empty.
    pub data: Vec<u8>,
}

impl Default for CreateBufferInfo {
    fn default() -> Self {
        Self {
            size: 0,
            usage: glow::DYNAMIC_DRAW,
            data: Vec::new(),
        }
    }
}

/// A renderbuffer, optionally multisampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Renderbuffer {
    /// Driver handle, `0` when not created.
    pub id: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Samples per pixel, `0` when single-sampled.
    pub samples: u32,
}

impl Renderbuffer {
    /// Whether the renderbuffer has been created and not destroyed.
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Options for [`create_renderbuffer`](crate::create_renderbuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CreateRenderbufferInfo {
    /// Storage layout.
    pub format: PixelFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `0` allocates single-sampled storage.
    pub samples: u32,
}

/// A framebuffer. Id `0` is the window's default framebuffer and
/// [`INVALID_FRAMEBUFFER`] means "not created".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framebuffer {
    /// Driver handle.
    pub id: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Completeness status reported by the driver at creation.
    pub status: u32,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            id: INVALID_FRAMEBUFFER,
            width: 0,
            height: 0,
            status: 0,
        }
    }
}

impl Framebuffer {
    /// The window's framebuffer at the given size. Passed explicitly to
    /// commands that need it; there is no global default.
    pub fn default_framebuffer(width: u32, height: u32) -> Self {
        Self {
            id: 0,
            width,
            height,
            status: glow::FRAMEBUFFER_COMPLETE,
        }
    }

    /// Whether the framebuffer handle refers to something.
    pub fn is_valid(&self) -> bool {
        self.id != INVALID_FRAMEBUFFER
    }

    /// Whether the driver reported the attachment set as complete.
    pub fn is_complete(&self) -> bool {
        self.is_valid() && self.status == glow::FRAMEBUFFER_COMPLETE
    }
}

/// What kind of object an [`Attachment`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// A [`Texture`], attached at level 0.
    Texture,
    /// A [`Renderbuffer`].
    Renderbuffer,
}

/// One framebuffer attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    /// `COLOR_ATTACHMENT0`, `DEPTH_ATTACHMENT`, ...
    pub point: u32,
    /// Object type behind `id`.
    pub kind: AttachmentKind,
    /// Texture or renderbuffer handle.
    pub id: u32,
}

impl Attachment {
    /// Attach mip level 0 of a texture.
    pub fn texture(point: u32, texture: &Texture) -> Self {
        Self {
            point,
            kind: AttachmentKind::Texture,
            id: texture.id,
        }
    }

    /// Attach a renderbuffer.
    pub fn renderbuffer(point: u32, renderbuffer: &Renderbuffer) -> Self {
        Self {
            point,
            kind: AttachmentKind::Renderbuffer,
            id: renderbuffer.id,
        }
    }
}

/// Options for [`create_framebuffer`](crate::create_framebuffer).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateFramebufferInfo {
    /// Width in pixels, recorded on the descriptor.
    pub width: u32,
    /// Height in pixels, recorded on the descriptor.
    pub height: u32,
    /// Attachments in binding order.
    pub attachments: Vec<Attachment>,
}

/// A compiled shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shader {
    /// Driver handle, `0` when not created.
    pub id: u32,
    /// GL stage enum, `0` once destroyed.
    pub target: u32,
}

impl Shader {
    /// Whether the shader has been created and not destroyed.
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Shader stage selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShaderType {
    #[default]
    /// Rejected by the factory.
    Unknown,
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
    /// Geometry stage.
    Geometry,
    /// Tessellation control stage.
    TessControl,
    /// Tessellation evaluation stage.
    TessEvaluation,
    /// Compute stage.
    Compute,
}

impl ShaderType {
    /// GL stage enum, `0` for `Unknown`.
    pub fn target(self) -> u32 {
        match self {
            ShaderType::Unknown => 0,
            ShaderType::Vertex => glow::VERTEX_SHADER,
            ShaderType::Fragment => glow::FRAGMENT_SHADER,
            ShaderType::Geometry => glow::GEOMETRY_SHADER,
            ShaderType::TessControl => glow::TESS_CONTROL_SHADER,
            ShaderType::TessEvaluation => glow::TESS_EVALUATION_SHADER,
            ShaderType::Compute => glow::COMPUTE_SHADER,
        }
    }
}

/// Options for [`create_shader`](crate::create_shader). The source is handed
/// to the driver verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateShaderInfo {
    /// Stage to compile.
    pub ty: ShaderType,
    /// GLSL source.
    pub source: String,
}

/// A reflected uniform or vertex attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramResourceInfo {
    /// Name with any `[0]` array suffix removed.
    pub name: String,
    /// Program that owns the location.
    pub program: u32,
    /// `-1` when the driver reports no location.
    pub location: i32,
    /// Array size, `1` for scalars.
    pub count: u32,
    /// GL type enum.
    pub ty: u32,
}

/// A reflected uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlockInfo {
    /// Block name.
    pub name: String,
    /// Program that owns the block.
    pub program: u32,
    /// Block index inside the program.
    pub index: u32,
    /// Indexed binding point the block reads from.
    pub binding: u32,
    /// Minimum buffer size in bytes.
    pub size: u32,
}

/// A linked program with its reflected interface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramPipeline {
    /// Program handle, `0` when not created.
    pub id: u32,
    /// Uniforms outside any block.
    pub uniforms: Vec<ProgramResourceInfo>,
    /// Vertex inputs.
    pub attributes: Vec<ProgramResourceInfo>,
    /// Uniform blocks.
    pub uniform_blocks: Vec<UniformBlockInfo>,
}

impl ProgramPipeline {
    /// Whether the program has been created and not destroyed.
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }

    /// Linear search of the reflected uniforms.
    pub fn uniform(&self, name: &str) -> Option<&ProgramResourceInfo> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// Linear search of the reflected uniform blocks.
    pub fn uniform_block(&self, name: &str) -> Option<&UniformBlockInfo> {
        self.uniform_blocks.iter().find(|b| b.name == name)
    }
}

/// Options for [`create_program_pipeline`](crate::create_program_pipeline).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreatePipelineInfo {
    /// Stages to link; invalid ones are skipped.
    pub shaders: Vec<Shader>,
}

/// An uploaded mesh: vertex buffer, optional index buffer and the vertex
/// array binding them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    /// Vertex buffer.
    pub vb: u32,
    /// Element buffer, `0` for unindexed formats.
    pub eb: u32,
    /// Vertex array object.
    pub vao: u32,
    /// Vertex format the array was built for.
    pub format: VertexFormat,
    /// Index count for indexed formats, vertex count otherwise.
    pub num_elements: u32,
}

impl Geometry {
    /// Whether the vertex array exists.
    pub fn is_valid(&self) -> bool {
        self.vao != 0
    }
}

/// Options for [`create_geometry`](crate::create_geometry).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateGeometryInfo {
    /// Vertices in `vertices`.
    pub vertices_num: usize,
    /// Indices in `indices`; `0` for unindexed formats.
    pub indices_num: usize,
    /// Lower corner of the bounding box, carried for callers; not used by
    /// the factory.
    pub min: [f32; 3],
    /// Upper corner of the bounding box.
    pub max: [f32; 3],
    /// Layout of `vertices`.
    pub format: VertexFormat,
    /// Interleaved vertex bytes in `format`'s layout.
    pub vertices: Vec<u8>,
    /// 16-bit element indices.
    pub indices: Vec<u16>,
}

impl CreateGeometryInfo {
    /// Build from typed vertices. The format comes from the vertex type, or
    /// its position-indexed sibling when a position-only mesh has indices.
    pub fn from_vertices<V: Vertex>(vertices: &[V], indices: &[u16]) -> Self {
        let format = if V::FORMAT == VertexFormat::V3F32 && !indices.is_empty() {
            VertexFormat::V3F32Ui16
        } else {
            V::FORMAT
        };
        let (min, max) = bounds(bytemuck::cast_slice(vertices), format.stride());
        Self {
            vertices_num: vertices.len(),
            indices_num: indices.len(),
            min,
            max,
            format,
            vertices: bytemuck::cast_slice(vertices).to_vec(),
            indices: indices.to_vec(),
        }
    }
}

/// Position bounds of interleaved vertices whose first field is a `[f32; 3]`
/// position.
fn bounds(bytes: &[u8], stride: usize) -> ([f32; 3], [f32; 3]) {
    if stride == 0 || bytes.len() < stride {
        return ([0.0; 3], [0.0; 3]);
    }
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for vertex in bytes.chunks_exact(stride) {
        let position: [f32; 3] = bytemuck::pod_read_unaligned(&vertex[..12]);
        for axis in 0..3 {
            min[axis] = min[axis].min(position[axis]);
            max[axis] = max[axis].max(position[axis]);
        }
    }
    (min, max)
}
