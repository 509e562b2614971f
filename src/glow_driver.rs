//! The OpenGL implementation of [`Driver`], built on [glow].
//!
//! [glow]: https://docs.rs/glow

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use glow::{HasContext, PixelUnpackData};

use crate::command::UniformValue;
use crate::driver::{Driver, TextureDesc};
use crate::format::TextureFormat;
use crate::shaders;
use crate::types::{
    Attachment, AttachmentKind, ProgramResourceInfo, TextureFiltering, UniformBlockInfo,
};
use crate::vertex::VertexLayout;

/// Anisotropy applied by [`TextureFiltering::Anisotropic`].
const MAX_ANISOTROPY: f32 = 16.0;

/// Convert a `u32` dimension to the `i32` GL expects, saturating.
fn gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn gl_offset(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Out-of-range units saturate to an invalid enum, which GL rejects.
fn texture_unit(unit: u32) -> u32 {
    glow::TEXTURE0.saturating_add(unit)
}

fn texture(id: u32) -> Option<glow::Texture> {
    NonZeroU32::new(id).map(glow::NativeTexture)
}

fn buffer(id: u32) -> Option<glow::Buffer> {
    NonZeroU32::new(id).map(glow::NativeBuffer)
}

fn vertex_array(id: u32) -> Option<glow::VertexArray> {
    NonZeroU32::new(id).map(glow::NativeVertexArray)
}

fn renderbuffer(id: u32) -> Option<glow::Renderbuffer> {
    NonZeroU32::new(id).map(glow::NativeRenderbuffer)
}

fn framebuffer(id: u32) -> Option<glow::Framebuffer> {
    NonZeroU32::new(id).map(glow::NativeFramebuffer)
}

fn shader(id: u32) -> Option<glow::Shader> {
    NonZeroU32::new(id).map(glow::NativeShader)
}

fn program(id: u32) -> Option<glow::Program> {
    NonZeroU32::new(id).map(glow::NativeProgram)
}

/// A [`Driver`] issuing real GL calls on a shared [`glow::Context`].
///
/// The driver remembers the program and framebuffer most recently bound
/// through it, so that uniform uploads, clears and blits, which need their
/// own bindings, can put them back afterwards.
///
/// # Safety
///
/// Every method issues GL calls. The context handed to
/// [`new`](Self::new) must stay current on the calling thread for as long
/// as the driver is used.
pub struct GlowDriver {
    gl: Arc<glow::Context>,
    bound_program: u32,
    bound_framebuffer: u32,
    /// Targets of textures created here, for binding by handle alone.
    texture_targets: HashMap<u32, u32>,
}

impl GlowDriver {
    /// Wrap a GL context.
    ///
    /// # Safety
    ///
    /// The `gl` context must be current and valid, and must remain so while
    /// the driver is in use.
    pub unsafe fn new(gl: Arc<glow::Context>) -> Self {
        Self {
            gl,
            bound_program: 0,
            bound_framebuffer: 0,
            texture_targets: HashMap::new(),
        }
    }

    /// The wrapped context.
    pub fn context(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    fn apply_filtering(&self, target: u32, filter: TextureFiltering, levels: u32) {
        let gl = &self.gl;
        let max_level = gl_size(levels.saturating_sub(1));
        // GL enum values are small enough that the cast is always safe.
        #[allow(clippy::cast_possible_wrap)]
        let (mag, min) = match filter {
            TextureFiltering::None => return,
            TextureFiltering::Bilinear => (glow::LINEAR as i32, glow::LINEAR as i32),
            TextureFiltering::Trilinear | TextureFiltering::Anisotropic => {
                (glow::LINEAR as i32, glow::LINEAR_MIPMAP_LINEAR as i32)
            }
        };
        unsafe {
            gl.tex_parameter_i32(target, glow::TEXTURE_BASE_LEVEL, 0);
            gl.tex_parameter_i32(target, glow::TEXTURE_MAX_LEVEL, max_level);
            gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, mag);
            gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, min);
            if filter == TextureFiltering::Anisotropic {
                gl.tex_parameter_f32(target, glow::TEXTURE_MAX_ANISOTROPY, MAX_ANISOTROPY);
            }
        }
    }

    fn restore_framebuffer(&self) {
        unsafe {
            self.gl
                .bind_framebuffer(glow::FRAMEBUFFER, framebuffer(self.bound_framebuffer));
        }
    }
}

impl Driver for GlowDriver {
    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<u32, String> {
        let gl = &self.gl;
        let levels = gl_size(desc.levels.max(1));
        let (w, h) = (gl_size(desc.width), gl_size(desc.height));
        let handle = unsafe { gl.create_texture() }?;

        unsafe {
            gl.bind_texture(desc.target, Some(handle));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);

            if desc.target == glow::TEXTURE_2D_ARRAY {
                let depth = gl_size(desc.depth);
                gl.tex_storage_3d(desc.target, levels, desc.format.internal, w, h, depth);
                for (layer, pixels) in desc.layers.iter().enumerate() {
                    gl.tex_sub_image_3d(
                        desc.target,
                        0,
                        0,
                        0,
                        gl_offset(layer),
                        w,
                        h,
                        1,
                        desc.format.format,
                        desc.format.ty,
                        PixelUnpackData::Slice(Some(*pixels)),
                    );
                }
            } else {
                gl.tex_storage_2d(desc.target, levels, desc.format.internal, w, h);
                if let Some(&pixels) = desc.layers.first() {
                    gl.tex_sub_image_2d(
                        desc.target,
                        0,
                        0,
                        0,
                        w,
                        h,
                        desc.format.format,
                        desc.format.ty,
                        PixelUnpackData::Slice(Some(pixels)),
                    );
                }
            }
        }

        self.apply_filtering(desc.target, desc.filter, desc.levels);

        unsafe {
            if desc.mipmaps {
                gl.generate_mipmap(desc.target);
            }
            gl.bind_texture(desc.target, None);
        }

        let id = handle.0.get();
        self.texture_targets.insert(id, desc.target);
        log::debug!(
            target: "gl",
            "Created texture {id} {}x{}x{} with {} levels",
            desc.width,
            desc.height,
            desc.depth,
            desc.levels
        );
        Ok(id)
    }

    fn delete_texture(&mut self, id: u32) {
        if let Some(handle) = texture(id) {
            self.texture_targets.remove(&id);
            unsafe { self.gl.delete_texture(handle) };
        }
    }

    fn create_buffer(&mut self, size: usize, data: Option<&[u8]>, usage: u32) -> Result<u32, String> {
        let gl = &self.gl;
        let handle = unsafe { gl.create_buffer() }?;
        unsafe {
            gl.bind_buffer(glow::COPY_WRITE_BUFFER, Some(handle));
            match data {
                Some(data) if data.len() == size => {
                    gl.buffer_data_u8_slice(glow::COPY_WRITE_BUFFER, data, usage);
                }
                Some(data) => {
                    gl.buffer_data_size(glow::COPY_WRITE_BUFFER, gl_offset(size), usage);
                    gl.buffer_sub_data_u8_slice(glow::COPY_WRITE_BUFFER, 0, data);
                }
                None => gl.buffer_data_size(glow::COPY_WRITE_BUFFER, gl_offset(size), usage),
            }
            gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
        }
        Ok(handle.0.get())
    }

    fn update_buffer(&mut self, id: u32, offset: usize, data: &[u8]) {
        let gl = &self.gl;
        unsafe {
            gl.bind_buffer(glow::COPY_WRITE_BUFFER, buffer(id));
            gl.buffer_sub_data_u8_slice(glow::COPY_WRITE_BUFFER, gl_offset(offset), data);
            gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
        }
    }

    fn delete_buffer(&mut self, id: u32) {
        if let Some(handle) = buffer(id) {
            unsafe { self.gl.delete_buffer(handle) };
        }
    }

    fn create_vertex_array(
        &mut self,
        layout: &VertexLayout,
        vertex_buffer: u32,
        index_buffer: u32,
    ) -> Result<u32, String> {
        let gl = &self.gl;
        let vao = unsafe { gl.create_vertex_array() }?;
        unsafe {
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, buffer(vertex_buffer));
            // The element binding is vertex-array state; it must be set while
            // the vertex array is bound and left bound afterwards.
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, buffer(index_buffer));
            for attribute in layout.attributes {
                gl.enable_vertex_attrib_array(attribute.location);
                gl.vertex_attrib_pointer_f32(
                    attribute.location,
                    attribute.components,
                    glow::FLOAT,
                    false,
                    layout.stride,
                    attribute.offset,
                );
            }
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        Ok(vao.0.get())
    }

    fn delete_vertex_array(&mut self, id: u32) {
        if let Some(handle) = vertex_array(id) {
            unsafe { self.gl.delete_vertex_array(handle) };
        }
    }

    fn create_renderbuffer(
        &mut self,
        format: &TextureFormat,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<u32, String> {
        let gl = &self.gl;
        let handle = unsafe { gl.create_renderbuffer() }?;
        unsafe {
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(handle));
            if samples > 0 {
                gl.renderbuffer_storage_multisample(
                    glow::RENDERBUFFER,
                    gl_size(samples),
                    format.internal,
                    gl_size(width),
                    gl_size(height),
                );
            } else {
                gl.renderbuffer_storage(
                    glow::RENDERBUFFER,
                    format.internal,
                    gl_size(width),
                    gl_size(height),
                );
            }
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);
        }
        Ok(handle.0.get())
    }

    fn delete_renderbuffer(&mut self, id: u32) {
        if let Some(handle) = renderbuffer(id) {
            unsafe { self.gl.delete_renderbuffer(handle) };
        }
    }

    fn create_framebuffer(&mut self, attachments: &[Attachment]) -> Result<(u32, u32), String> {
        let gl = &self.gl;
        let handle = unsafe { gl.create_framebuffer() }?;
        let status = unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(handle));
            for attachment in attachments {
                match attachment.kind {
                    AttachmentKind::Texture => gl.framebuffer_texture(
                        glow::FRAMEBUFFER,
                        attachment.point,
                        texture(attachment.id),
                        0,
                    ),
                    AttachmentKind::Renderbuffer => gl.framebuffer_renderbuffer(
                        glow::FRAMEBUFFER,
                        attachment.point,
                        glow::RENDERBUFFER,
                        renderbuffer(attachment.id),
                    ),
                }
            }

            let color: Vec<u32> = attachments
                .iter()
                .map(|a| a.point)
                .filter(|p| (glow::COLOR_ATTACHMENT0..glow::COLOR_ATTACHMENT0 + 32).contains(p))
                .collect();
            if color.is_empty() {
                gl.draw_buffer(glow::NONE);
                gl.read_buffer(glow::NONE);
            } else {
                gl.draw_buffers(&color);
            }

            gl.check_framebuffer_status(glow::FRAMEBUFFER)
        };
        self.restore_framebuffer();

        let id = handle.0.get();
        if status != glow::FRAMEBUFFER_COMPLETE {
            log::warn!(target: "gl", "Framebuffer {id} incomplete: status {status:#x}");
        }
        Ok((id, status))
    }

    fn delete_framebuffer(&mut self, id: u32) {
        if let Some(handle) = framebuffer(id) {
            if self.bound_framebuffer == id {
                self.bound_framebuffer = 0;
            }
            unsafe { self.gl.delete_framebuffer(handle) };
        }
    }

    fn create_shader(&mut self, stage: u32, source: &str) -> Result<u32, String> {
        let handle = unsafe { shaders::compile_shader(&self.gl, stage, source) }?;
        Ok(handle.0.get())
    }

    fn delete_shader(&mut self, id: u32) {
        if let Some(handle) = shader(id) {
            unsafe { self.gl.delete_shader(handle) };
        }
    }

    fn create_program(&mut self, shaders: &[u32]) -> Result<u32, String> {
        let stages: Vec<glow::Shader> = shaders.iter().filter_map(|&id| shader(id)).collect();
        let handle = unsafe { shaders::link_program(&self.gl, &stages) }?;
        Ok(handle.0.get())
    }

    fn delete_program(&mut self, id: u32) {
        if let Some(handle) = program(id) {
            if self.bound_program == id {
                self.bound_program = 0;
            }
            unsafe { self.gl.delete_program(handle) };
        }
    }

    fn program_uniforms(&mut self, id: u32) -> Vec<ProgramResourceInfo> {
        program(id).map_or_else(Vec::new, |p| unsafe { shaders::uniforms(&self.gl, p) })
    }

    fn program_attributes(&mut self, id: u32) -> Vec<ProgramResourceInfo> {
        program(id).map_or_else(Vec::new, |p| unsafe { shaders::attributes(&self.gl, p) })
    }

    fn program_uniform_blocks(&mut self, id: u32) -> Vec<UniformBlockInfo> {
        program(id).map_or_else(Vec::new, |p| unsafe { shaders::uniform_blocks(&self.gl, p) })
    }

    fn enable(&mut self, capability: u32) {
        unsafe { self.gl.enable(capability) };
    }

    fn disable(&mut self, capability: u32) {
        unsafe { self.gl.disable(capability) };
    }

    fn blend_func(&mut self, sfactor: u32, dfactor: u32) {
        unsafe { self.gl.blend_func(sfactor, dfactor) };
    }

    fn cull_face(&mut self, mode: u32) {
        unsafe { self.gl.cull_face(mode) };
    }

    fn depth_func(&mut self, func: u32) {
        unsafe { self.gl.depth_func(func) };
    }

    fn depth_mask(&mut self, write: bool) {
        unsafe { self.gl.depth_mask(write) };
    }

    // Viewport components are pixel counts; truncation is intended.
    #[allow(clippy::cast_possible_truncation)]
    fn clear(&mut self, fb: u32, viewport: [f32; 4], color: [f32; 4], depth: Option<f32>) {
        let gl = &self.gl;
        let [x, y, w, h] = viewport.map(|v| v as i32);
        let [r, g, b, a] = color;
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer(fb));
            gl.viewport(x, y, w, h);
            gl.clear_color(r, g, b, a);
            let mut mask = glow::COLOR_BUFFER_BIT;
            if let Some(depth) = depth {
                gl.clear_depth_f32(depth);
                mask |= glow::DEPTH_BUFFER_BIT;
            }
            gl.clear(mask);
        }
        self.restore_framebuffer();
    }

    fn bind_buffer(&mut self, target: u32, id: u32) {
        unsafe { self.gl.bind_buffer(target, buffer(id)) };
    }

    fn bind_buffer_range(&mut self, target: u32, index: u32, id: u32, offset: usize, size: usize) {
        unsafe {
            self.gl.bind_buffer_range(
                target,
                index,
                buffer(id),
                gl_offset(offset),
                gl_offset(size),
            );
        }
    }

    fn bind_program(&mut self, id: u32) {
        self.bound_program = id;
        unsafe { self.gl.use_program(program(id)) };
    }

    fn bind_vertex_array(&mut self, id: u32) {
        unsafe { self.gl.bind_vertex_array(vertex_array(id)) };
    }

    fn bind_texture(&mut self, unit: u32, id: u32) {
        let target = self
            .texture_targets
            .get(&id)
            .copied()
            .unwrap_or(glow::TEXTURE_2D);
        unsafe {
            self.gl.active_texture(texture_unit(unit));
            self.gl.bind_texture(target, texture(id));
        }
    }

    fn bind_framebuffer(&mut self, id: u32) {
        self.bound_framebuffer = id;
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer(id)) };
    }

    fn blit_framebuffer(&mut self, src: u32, dst: u32, src_rect: [i32; 4], dst_rect: [i32; 4]) {
        let gl = &self.gl;
        let [sx, sy, sw, sh] = src_rect;
        let [dx, dy, dw, dh] = dst_rect;
        unsafe {
            gl.bind_framebuffer(glow::READ_FRAMEBUFFER, framebuffer(src));
            gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, framebuffer(dst));
            gl.blit_framebuffer(
                sx,
                sy,
                sx.saturating_add(sw),
                sy.saturating_add(sh),
                dx,
                dy,
                dx.saturating_add(dw),
                dy.saturating_add(dh),
                glow::COLOR_BUFFER_BIT,
                glow::LINEAR,
            );
        }
        self.restore_framebuffer();
    }

    #[allow(clippy::cast_sign_loss)]
    fn set_uniform(&mut self, id: u32, location: i32, value: &UniformValue) {
        if location < 0 {
            return;
        }
        let gl = &self.gl;
        let location = glow::NativeUniformLocation(location as u32);
        let location = Some(&location);
        unsafe {
            if id != self.bound_program {
                gl.use_program(program(id));
            }
            match value {
                UniformValue::Int(v) => gl.uniform_1_i32(location, *v),
                UniformValue::Float(v) => gl.uniform_1_f32(location, *v),
                UniformValue::Vec2(v) => gl.uniform_2_f32_slice(location, v),
                UniformValue::Vec3(v) => gl.uniform_3_f32_slice(location, v),
                UniformValue::Vec4(v) => gl.uniform_4_f32_slice(location, v),
                UniformValue::Mat4(m) => {
                    gl.uniform_matrix_4_f32_slice(location, false, m.as_flattened());
                }
            }
            if id != self.bound_program {
                gl.use_program(program(self.bound_program));
            }
        }
    }

    fn draw_indexed(&mut self, mode: u32, count: u32, base_vertex: u32, instances: u32) {
        let gl = &self.gl;
        let (count, base) = (gl_size(count), gl_size(base_vertex));
        unsafe {
            if instances > 1 {
                gl.draw_elements_instanced_base_vertex(
                    mode,
                    count,
                    glow::UNSIGNED_SHORT,
                    0,
                    gl_size(instances),
                    base,
                );
            } else {
                gl.draw_elements_base_vertex(mode, count, glow::UNSIGNED_SHORT, 0, base);
            }
        }
    }

    fn draw_arrays(&mut self, mode: u32, first: u32, count: u32, instances: u32) {
        let gl = &self.gl;
        let (first, count) = (gl_size(first), gl_size(count));
        unsafe {
            if instances > 1 {
                gl.draw_arrays_instanced(mode, first, count, gl_size(instances));
            } else {
                gl.draw_arrays(mode, first, count);
            }
        }
    }
}
