//! The deferred command vocabulary.
//!
//! Commands are plain data: handles copied out of descriptors plus the
//! scalars the driver call needs. Name lookups (uniforms, uniform blocks)
//! happen once, when the command is built, so replay is a straight walk.

use crate::types::{Buffer, BufferType, Framebuffer, Geometry, ProgramPipeline};
use crate::vertex::VertexFormat;

/// Value carried by a [`SetUniformCommand`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// 32-bit signed integer.
    Int(i32),
    /// Scalar float.
    Float(f32),
    /// Two-component float vector.
    Vec2([f32; 2]),
    /// Three-component float vector.
    Vec3([f32; 3]),
    /// Four-component float vector.
    Vec4([f32; 4]),
    /// Column-major.
    Mat4([[f32; 4]; 4]),
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<[[f32; 4]; 4]> for UniformValue {
    fn from(v: [[f32; 4]; 4]) -> Self {
        UniformValue::Mat4(v)
    }
}

/// Clear a framebuffer's color, and its depth when the replaying buffer
/// writes depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearCommand {
    /// RGBA clear color.
    pub color: [f32; 4],
    /// `[x, y, width, height]`.
    pub viewport: [f32; 4],
    /// Depth clear value.
    pub depth: f32,
    /// Target framebuffer, `0` for the window.
    pub framebuffer: u32,
}

impl ClearCommand {
    /// Clear the whole of `framebuffer`. Pass
    /// [`Framebuffer::default_framebuffer`] for the window.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(framebuffer: &Framebuffer, color: [f32; 4]) -> Self {
        Self {
            color,
            viewport: [0.0, 0.0, framebuffer.width as f32, framebuffer.height as f32],
            depth: 1.0,
            framebuffer: framebuffer.id,
        }
    }
}

/// Bind a buffer, either plainly or to a uniform block's indexed binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindBufferCommand {
    /// Binding target family.
    pub ty: BufferType,
    /// Buffer handle.
    pub id: u32,
    /// Resolved block binding, `-1` for a plain bind.
    pub block_index: i32,
    /// Start of the bound range in bytes.
    pub offset: usize,
    /// Length of the bound range in bytes.
    pub size: usize,
}

impl BindBufferCommand {
    /// Plain bind to `ty`'s target.
    pub fn new(ty: BufferType, buffer: &Buffer) -> Self {
        Self {
            ty,
            id: buffer.id,
            block_index: -1,
            offset: 0,
            size: buffer.size,
        }
    }

    /// Ranged bind of the whole buffer to the binding point of the uniform
    /// block `name` in `pipeline`.
    ///
    /// If no block of that name exists the command degrades to a plain bind
    /// and a warning is logged.
    pub fn block(ty: BufferType, buffer: &Buffer, pipeline: &ProgramPipeline, name: &str) -> Self {
        let mut command = Self::new(ty, buffer);
        match pipeline.uniform_block(name) {
            Some(block) => {
                command.block_index = i32::try_from(block.binding).unwrap_or(-1);
            }
            None => log::warn!(
                target: "gl",
                "Uniform block '{name}' not found in program {}, binding buffer {} unindexed",
                pipeline.id,
                buffer.id
            ),
        }
        command
    }
}

/// Bind a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindProgramCommand {
    /// Program handle.
    pub id: u32,
}

impl BindProgramCommand {
    /// Bind `pipeline`.
    pub fn new(pipeline: &ProgramPipeline) -> Self {
        Self { id: pipeline.id }
    }
}

/// Bind a vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindVertexArrayCommand {
    /// Vertex array handle.
    pub id: u32,
}

impl BindVertexArrayCommand {
    /// Bind the vertex array of `geometry`.
    pub fn new(geometry: &Geometry) -> Self {
        Self { id: geometry.vao }
    }
}

/// Bind a texture to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindTextureCommand {
    /// Texture unit index, counted from `TEXTURE0`.
    pub unit: u32,
    /// Texture handle.
    pub id: u32,
    /// Sampler object. Recorded but not bound on replay.
    pub sampler: u32,
}

/// Bind a framebuffer for drawing; `0` is the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindFramebufferCommand {
    /// Framebuffer handle.
    pub id: u32,
}

impl BindFramebufferCommand {
    /// Bind `framebuffer`.
    pub fn new(framebuffer: &Framebuffer) -> Self {
        Self { id: framebuffer.id }
    }
}

/// Copy the color of one framebuffer into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlitFramebufferCommand {
    /// Framebuffer read from.
    pub src: u32,
    /// Framebuffer written to.
    pub dst: u32,
    /// Source rectangle left edge.
    pub src_x: i32,
    /// Source rectangle bottom edge.
    pub src_y: i32,
    /// Source rectangle width.
    pub src_w: i32,
    /// Source rectangle height.
    pub src_h: i32,
    /// Destination rectangle left edge.
    pub dst_x: i32,
    /// Destination rectangle bottom edge.
    pub dst_y: i32,
    /// Destination rectangle width.
    pub dst_w: i32,
    /// Destination rectangle height.
    pub dst_h: i32,
}

impl BlitFramebufferCommand {
    /// Full-size blit; the rects are fixed from the sizes the framebuffers
    /// have now.
    pub fn new(src: &Framebuffer, dst: &Framebuffer) -> Self {
        Self {
            src: src.id,
            dst: dst.id,
            src_x: 0,
            src_y: 0,
            src_w: i32::try_from(src.width).unwrap_or(i32::MAX),
            src_h: i32::try_from(src.height).unwrap_or(i32::MAX),
            dst_x: 0,
            dst_y: 0,
            dst_w: i32::try_from(dst.width).unwrap_or(i32::MAX),
            dst_h: i32::try_from(dst.height).unwrap_or(i32::MAX),
        }
    }
}

/// Upload one uniform value.
#[derive(Debug, Clone, PartialEq)]
pub struct SetUniformCommand {
    /// Owning program, `0` when the name did not resolve.
    pub program: u32,
    /// `-1` when the name did not resolve.
    pub location: i32,
    /// Reflected array size of the uniform. Kept for inspection; replay
    /// uploads the single `value`.
    pub count: u32,
    /// Value uploaded on replay.
    pub value: UniformValue,
    /// Uniform name as looked up.
    pub name: String,
}

impl SetUniformCommand {
    /// Look `name` up in `pipeline`. An unknown name yields a command that
    /// does nothing on replay.
    pub fn new(pipeline: &ProgramPipeline, name: &str, value: impl Into<UniformValue>) -> Self {
        let value = value.into();
        match pipeline.uniform(name) {
            Some(u) => Self {
                program: u.program,
                location: u.location,
                count: u.count,
                value,
                name: name.to_owned(),
            },
            None => {
                log::debug!(target: "gl", "Uniform '{name}' not found in program {}", pipeline.id);
                Self {
                    program: 0,
                    location: -1,
                    count: 0,
                    value,
                    name: name.to_owned(),
                }
            }
        }
    }

    /// Whether replay will issue an upload.
    pub fn is_resolved(&self) -> bool {
        self.program != 0 && self.location >= 0
    }
}

/// Draw the bound vertex array.
///
/// Indexed formats read 16-bit indices; `base_element` is the base vertex
/// for indexed draws and the first vertex for array draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawElementsCommand {
    /// Vertex format of the bound array; decides indexed vs array draws.
    pub format: VertexFormat,
    /// Primitive topology.
    pub mode: u32,
    /// Base vertex (indexed) or first vertex (array).
    pub base_element: u32,
    /// Indices or vertices to draw.
    pub num_elements: u32,
    /// Instance count; `1` for a plain draw.
    pub num_instances: u32,
}

impl Default for DrawElementsCommand {
    fn default() -> Self {
        Self {
            format: VertexFormat::Unknown,
            mode: glow::TRIANGLES,
            base_element: 0,
            num_elements: 0,
            num_instances: 1,
        }
    }
}

impl DrawElementsCommand {
    /// Draw all of `geometry` as triangles, `instances` times.
    pub fn for_geometry(geometry: &Geometry, instances: u32) -> Self {
        Self {
            format: geometry.format,
            num_elements: geometry.num_elements,
            num_instances: instances,
            ..Self::default()
        }
    }
}

/// One deferred driver operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// See [`ClearCommand`].
    Clear(ClearCommand),
    /// See [`BindBufferCommand`].
    BindBuffer(BindBufferCommand),
    /// See [`BindProgramCommand`].
    BindProgram(BindProgramCommand),
    /// See [`BindVertexArrayCommand`].
    BindVertexArray(BindVertexArrayCommand),
    /// See [`BindTextureCommand`].
    BindTexture(BindTextureCommand),
    /// See [`BindFramebufferCommand`].
    BindFramebuffer(BindFramebufferCommand),
    /// See [`BlitFramebufferCommand`].
    BlitFramebuffer(BlitFramebufferCommand),
    /// See [`SetUniformCommand`].
    SetUniform(SetUniformCommand),
    /// See [`DrawElementsCommand`].
    DrawElements(DrawElementsCommand),
}

macro_rules! impl_from_command {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Command {
                fn from(c: $ty) -> Self {
                    Command::$variant(c)
                }
            }
        )*
    };
}

impl_from_command!(
    Clear(ClearCommand),
    BindBuffer(BindBufferCommand),
    BindProgram(BindProgramCommand),
    BindVertexArray(BindVertexArrayCommand),
    BindTexture(BindTextureCommand),
    BindFramebuffer(BindFramebufferCommand),
    BlitFramebuffer(BlitFramebufferCommand),
    SetUniform(SetUniformCommand),
    DrawElements(DrawElementsCommand),
);
