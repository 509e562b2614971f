//! The GPU driver seam.
//!
//! [`Driver`] is everything the factories and the dispatcher ask of the
//! graphics API. Handles are raw `u32` values; `0` means "none" for every
//! object kind, so implementations must treat a zero handle in a bind or
//! delete as an unbind or a no-op. Stale non-zero handles are passed through
//! untouched: what the API does with them is the driver's business.
//!
//! [`GlowDriver`](crate::GlowDriver) is the production implementation.

use crate::command::UniformValue;
use crate::format::TextureFormat;
use crate::types::{Attachment, ProgramResourceInfo, TextureFiltering, UniformBlockInfo};
use crate::vertex::VertexLayout;

/// Everything needed to allocate and fill a texture in one call.
#[derive(Debug, Clone, Copy)]
pub struct TextureDesc<'a> {
    /// `TEXTURE_2D` or `TEXTURE_2D_ARRAY`.
    pub target: u32,
    /// GL format triple of the storage and uploads.
    pub format: TextureFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Layer count for arrays, ignored for 2D.
    pub depth: u32,
    /// Mip levels to allocate, at least 1.
    pub levels: u32,
    /// Minification and magnification filtering.
    pub filter: TextureFiltering,
    /// Generate the mip chain after upload.
    pub mipmaps: bool,
    /// Initial contents, one slice per layer. Empty leaves storage blank.
    pub layers: &'a [&'a [u8]],
}

/// The graphics API as seen by this crate.
///
/// All methods are infallible except object creation; the command path has
/// no error channel.
pub trait Driver {
    /// Allocate storage, upload `desc.layers`, apply filtering and build
    /// mipmaps.
    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<u32, String>;
    /// Delete a texture.
    fn delete_texture(&mut self, id: u32);

    /// Allocate `size` bytes, filled from `data` when given.
    fn create_buffer(&mut self, size: usize, data: Option<&[u8]>, usage: u32)
        -> Result<u32, String>;
    /// Overwrite bytes of a buffer starting at `offset`.
    fn update_buffer(&mut self, id: u32, offset: usize, data: &[u8]);
    /// Delete a buffer.
    fn delete_buffer(&mut self, id: u32);

    /// Bind `vertex_buffer` with `layout` and, when non-zero, `index_buffer`
    /// into a new vertex array.
    fn create_vertex_array(
        &mut self,
        layout: &VertexLayout,
        vertex_buffer: u32,
        index_buffer: u32,
    ) -> Result<u32, String>;
    /// Delete a vertex array.
    fn delete_vertex_array(&mut self, id: u32);

    /// Allocate a renderbuffer, multisampled when `samples` is non-zero.
    fn create_renderbuffer(
        &mut self,
        format: &TextureFormat,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<u32, String>;
    /// Delete a renderbuffer.
    fn delete_renderbuffer(&mut self, id: u32);

    /// Create a framebuffer from attachments. Returns the handle and the
    /// completeness status.
    fn create_framebuffer(&mut self, attachments: &[Attachment]) -> Result<(u32, u32), String>;
    /// Delete a framebuffer.
    fn delete_framebuffer(&mut self, id: u32);

    /// Compile one stage. `Err` carries the compiler log.
    fn create_shader(&mut self, stage: u32, source: &str) -> Result<u32, String>;
    /// Delete a shader stage.
    fn delete_shader(&mut self, id: u32);

    /// Link compiled stages into a program. `Err` carries the link log.
    fn create_program(&mut self, shaders: &[u32]) -> Result<u32, String>;
    /// Delete a program.
    fn delete_program(&mut self, id: u32);
    /// Active uniforms outside any block.
    fn program_uniforms(&mut self, program: u32) -> Vec<ProgramResourceInfo>;
    /// Active vertex inputs.
    fn program_attributes(&mut self, program: u32) -> Vec<ProgramResourceInfo>;
    /// Active uniform blocks.
    fn program_uniform_blocks(&mut self, program: u32) -> Vec<UniformBlockInfo>;

    /// Turn a capability on.
    fn enable(&mut self, capability: u32);
    /// Turn a capability off.
    fn disable(&mut self, capability: u32);
    /// Set the blend factors.
    fn blend_func(&mut self, sfactor: u32, dfactor: u32);
    /// Select the faces to cull.
    fn cull_face(&mut self, mode: u32);
    /// Set the depth comparison.
    fn depth_func(&mut self, func: u32);
    /// Enable or disable depth writes.
    fn depth_mask(&mut self, write: bool);

    /// Set the viewport, clear color and, when `depth` is given, depth of
    /// `framebuffer`.
    fn clear(&mut self, framebuffer: u32, viewport: [f32; 4], color: [f32; 4], depth: Option<f32>);
    /// Bind a buffer to `target`.
    fn bind_buffer(&mut self, target: u32, id: u32);
    /// Bind a range of a buffer to an indexed `target` binding.
    fn bind_buffer_range(&mut self, target: u32, index: u32, id: u32, offset: usize, size: usize);
    /// Make a program current.
    fn bind_program(&mut self, id: u32);
    /// Bind a vertex array.
    fn bind_vertex_array(&mut self, id: u32);
    /// Bind a texture to unit `unit`.
    fn bind_texture(&mut self, unit: u32, id: u32);
    /// Bind a framebuffer for drawing.
    fn bind_framebuffer(&mut self, id: u32);
    /// Copy color from `src` to `dst`, rects given as
    /// `[x, y, width, height]`, linear filter.
    fn blit_framebuffer(&mut self, src: u32, dst: u32, src_rect: [i32; 4], dst_rect: [i32; 4]);
    /// Upload `value` to `location` of `program`; a `-1` location does nothing.
    fn set_uniform(&mut self, program: u32, location: i32, value: &UniformValue);
    /// Indexed draw with 16-bit indices.
    fn draw_indexed(&mut self, mode: u32, count: u32, base_vertex: u32, instances: u32);
    /// Non-indexed draw of `count` vertices from `first`.
    fn draw_arrays(&mut self, mode: u32, first: u32, count: u32, instances: u32);
}
