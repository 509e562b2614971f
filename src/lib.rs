//! Deferred GPU command buffers over OpenGL via [glow].
//!
//! Rendering is recorded, not issued. Application code creates resources
//! through the factory functions, which return plain value-typed
//! descriptors ([`Texture`], [`Geometry`], [`ProgramPipeline`], ...). It then
//! appends commands that capture those descriptors' handles to a
//! [`CommandBuffer`] and hands the buffers to [`present`], which replays
//! them in order against a [`Driver`].
//!
//! # Features
//!
//! - **Fixed pipeline state per buffer**: blend, rasterizer and
//!   depth-stencil state are applied around every command and reverted
//!   after it, so no state leaks between commands or buffers.
//! - **Retained buffers**: a buffer with `presentation_clear` off replays
//!   the same commands every frame.
//! - **Closed command set**: nine command kinds dispatched through one
//!   exhaustive `match`.
//! - **Vertex-format table**: one [`VertexFormat`] decides stride,
//!   attribute bindings and indexed vs array draws.
//! - **Image loading**: a Targa reader/writer, plus PNG/JPEG via [image].
//! - **Fixed-timestep loop** over any [`Surface`].
//!
//! # Safety
//!
//! [`GlowDriver`] issues raw GL calls. Constructing one is `unsafe`: the
//! context must be current on the calling thread for as long as the driver
//! is used. Everything else in this crate is safe and works against any
//! [`Driver`].
//!
//! [glow]: https://docs.rs/glow
//! [image]: https://docs.rs/image

mod command;
mod driver;
mod error;
mod format;
mod glow_driver;
mod loader;
mod mainloop;
mod present;
pub mod primitives;
mod queue;
mod resources;
mod shaders;
mod state;
pub mod targa;
#[cfg(test)]
mod testing;
mod types;
mod vertex;

pub use command::{
    BindBufferCommand, BindFramebufferCommand, BindProgramCommand, BindTextureCommand,
    BindVertexArrayCommand, BlitFramebufferCommand, ClearCommand, Command, DrawElementsCommand,
    SetUniformCommand, UniformValue,
};
pub use driver::{Driver, TextureDesc};
pub use error::{Error, Result};
pub use format::{PixelFormat, TextureFormat};
pub use glow_driver::GlowDriver;
pub use loader::{load_image, load_targa, load_targa_file, Image};
pub use mainloop::{FixedTimestep, Mainloop, MainloopConfig, Surface};
pub use present::present;
pub use queue::{CommandBuffer, CommandQueue};
pub use resources::{
    create_buffer, create_framebuffer, create_geometry, create_program_pipeline,
    create_renderbuffer, create_shader, create_texture, create_texture_array, destroy_buffer,
    destroy_framebuffer, destroy_geometry, destroy_program_pipeline, destroy_renderbuffer,
    destroy_shader, destroy_texture, try_create_program_pipeline, try_create_shader,
    update_buffer,
};
pub use state::{ColorBlendState, DepthStencilState, RasterizerState};
pub use types::{
    Attachment, AttachmentKind, Buffer, BufferType, CreateBufferInfo, CreateFramebufferInfo,
    CreateGeometryInfo, CreatePipelineInfo, CreateRenderbufferInfo, CreateShaderInfo,
    CreateTextureArrayInfo, CreateTextureInfo, Framebuffer, Geometry, ProgramPipeline,
    ProgramResourceInfo, Renderbuffer, Shader, ShaderType, Texture, TextureFiltering,
    UniformBlockInfo, INVALID_FRAMEBUFFER,
};
pub use vertex::{
    Vertex, VertexAttribute, VertexFormat, VertexLayout, NORMAL_LOCATION, POSITION_LOCATION,
    TANGENT_LOCATION, UV_LOCATION, V3, V3N3, V3T2, V3T2N3, V3Uv2N3T3,
};
