//! A [`Driver`] that records calls instead of talking to a GPU.

use crate::command::UniformValue;
use crate::driver::{Driver, TextureDesc};
use crate::format::TextureFormat;
use crate::types::{Attachment, ProgramResourceInfo, UniformBlockInfo};
use crate::vertex::VertexLayout;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTexture {
        target: u32,
        internal: u32,
        width: u32,
        height: u32,
        depth: u32,
        levels: u32,
        layers: usize,
        mipmaps: bool,
    },
    DeleteTexture(u32),
    CreateBuffer(usize, Option<Vec<u8>>),
    UpdateBuffer(u32, usize, Vec<u8>),
    DeleteBuffer(u32),
    CreateVertexArray(i32, usize, u32, u32),
    DeleteVertexArray(u32),
    CreateRenderbuffer(u32, u32, u32, u32),
    DeleteRenderbuffer(u32),
    CreateFramebuffer(Vec<Attachment>),
    DeleteFramebuffer(u32),
    CreateShader(u32),
    DeleteShader(u32),
    CreateProgram(Vec<u32>),
    DeleteProgram(u32),
    Enable(u32),
    Disable(u32),
    BlendFunc(u32, u32),
    CullFace(u32),
    DepthFunc(u32),
    DepthMask(bool),
    Clear(u32, [f32; 4], [f32; 4], Option<f32>),
    BindBuffer(u32, u32),
    BindBufferRange(u32, u32, u32, usize, usize),
    BindProgram(u32),
    BindVertexArray(u32),
    BindTexture(u32, u32),
    BindFramebuffer(u32),
    Blit(u32, u32, [i32; 4], [i32; 4]),
    SetUniform(u32, i32, UniformValue),
    DrawIndexed(u32, u32, u32, u32),
    DrawArrays(u32, u32, u32, u32),
}

impl Call {
    fn is_state(&self) -> bool {
        matches!(
            self,
            Call::Enable(_)
                | Call::Disable(_)
                | Call::BlendFunc(..)
                | Call::CullFace(_)
                | Call::DepthFunc(_)
                | Call::DepthMask(_)
        )
    }
}

#[derive(Debug)]
pub struct RecordingDriver {
    pub calls: Vec<Call>,
    /// Handle the next successful creation returns.
    pub(crate) next_handle: u32,
    /// Compiler log to fail every shader with.
    pub fail_compile: Option<String>,
    pub fail_link: Option<String>,
    /// Make every object allocation fail.
    pub fail_alloc: bool,
    pub framebuffer_status: u32,
    /// Reflection results handed out for any program.
    pub uniforms: Vec<ProgramResourceInfo>,
    pub attributes: Vec<ProgramResourceInfo>,
    pub uniform_blocks: Vec<UniformBlockInfo>,
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            next_handle: 1,
            fail_compile: None,
            fail_link: None,
            fail_alloc: false,
            framebuffer_status: glow::FRAMEBUFFER_COMPLETE,
            uniforms: Vec::new(),
            attributes: Vec::new(),
            uniform_blocks: Vec::new(),
        }
    }
}

impl RecordingDriver {
    /// Calls issued by command dispatch, without the state bracketing.
    pub fn dispatched(&self) -> Vec<Call> {
        self.calls.iter().filter(|c| !c.is_state()).cloned().collect()
    }

    fn allocate(&mut self, call: Call) -> Result<u32, String> {
        self.calls.push(call);
        if self.fail_alloc {
            return Err("out of memory".into());
        }
        let id = self.next_handle;
        self.next_handle += 1;
        Ok(id)
    }
}

impl Driver for RecordingDriver {
    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<u32, String> {
        self.allocate(Call::CreateTexture {
            target: desc.target,
            internal: desc.format.internal,
            width: desc.width,
            height: desc.height,
            depth: desc.depth,
            levels: desc.levels,
            layers: desc.layers.len(),
            mipmaps: desc.mipmaps,
        })
    }

    fn delete_texture(&mut self, id: u32) {
        self.calls.push(Call::DeleteTexture(id));
    }

    fn create_buffer(&mut self, size: usize, data: Option<&[u8]>, _usage: u32) -> Result<u32, String> {
        self.allocate(Call::CreateBuffer(size, data.map(<[u8]>::to_vec)))
    }

    fn update_buffer(&mut self, id: u32, offset: usize, data: &[u8]) {
        self.calls.push(Call::UpdateBuffer(id, offset, data.to_vec()));
    }

    fn delete_buffer(&mut self, id: u32) {
        self.calls.push(Call::DeleteBuffer(id));
    }

    fn create_vertex_array(
        &mut self,
        layout: &VertexLayout,
        vertex_buffer: u32,
        index_buffer: u32,
    ) -> Result<u32, String> {
        self.allocate(Call::CreateVertexArray(
            layout.stride,
            layout.attributes.len(),
            vertex_buffer,
            index_buffer,
        ))
    }

    fn delete_vertex_array(&mut self, id: u32) {
        self.calls.push(Call::DeleteVertexArray(id));
    }

    fn create_renderbuffer(
        &mut self,
        format: &TextureFormat,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<u32, String> {
        self.allocate(Call::CreateRenderbuffer(format.internal, width, height, samples))
    }

    fn delete_renderbuffer(&mut self, id: u32) {
        self.calls.push(Call::DeleteRenderbuffer(id));
    }

    fn create_framebuffer(&mut self, attachments: &[Attachment]) -> Result<(u32, u32), String> {
        let id = self.allocate(Call::CreateFramebuffer(attachments.to_vec()))?;
        Ok((id, self.framebuffer_status))
    }

    fn delete_framebuffer(&mut self, id: u32) {
        self.calls.push(Call::DeleteFramebuffer(id));
    }

    fn create_shader(&mut self, stage: u32, _source: &str) -> Result<u32, String> {
        if let Some(log) = &self.fail_compile {
            self.calls.push(Call::CreateShader(stage));
            return Err(log.clone());
        }
        self.allocate(Call::CreateShader(stage))
    }

    fn delete_shader(&mut self, id: u32) {
        self.calls.push(Call::DeleteShader(id));
    }

    fn create_program(&mut self, shaders: &[u32]) -> Result<u32, String> {
        if let Some(log) = &self.fail_link {
            self.calls.push(Call::CreateProgram(shaders.to_vec()));
            return Err(log.clone());
        }
        self.allocate(Call::CreateProgram(shaders.to_vec()))
    }

    fn delete_program(&mut self, id: u32) {
        self.calls.push(Call::DeleteProgram(id));
    }

    fn program_uniforms(&mut self, program: u32) -> Vec<ProgramResourceInfo> {
        self.uniforms
            .iter()
            .cloned()
            .map(|u| ProgramResourceInfo { program, ..u })
            .collect()
    }

    fn program_attributes(&mut self, program: u32) -> Vec<ProgramResourceInfo> {
        self.attributes
            .iter()
            .cloned()
            .map(|a| ProgramResourceInfo { program, ..a })
            .collect()
    }

    fn program_uniform_blocks(&mut self, program: u32) -> Vec<UniformBlockInfo> {
        self.uniform_blocks
            .iter()
            .cloned()
            .map(|b| UniformBlockInfo { program, ..b })
            .collect()
    }

    fn enable(&mut self, capability: u32) {
        self.calls.push(Call::Enable(capability));
    }

    fn disable(&mut self, capability: u32) {
        self.calls.push(Call::Disable(capability));
    }

    fn blend_func(&mut self, sfactor: u32, dfactor: u32) {
        self.calls.push(Call::BlendFunc(sfactor, dfactor));
    }

    fn cull_face(&mut self, mode: u32) {
        self.calls.push(Call::CullFace(mode));
    }

    fn depth_func(&mut self, func: u32) {
        self.calls.push(Call::DepthFunc(func));
    }

    fn depth_mask(&mut self, write: bool) {
        self.calls.push(Call::DepthMask(write));
    }

    fn clear(&mut self, framebuffer: u32, viewport: [f32; 4], color: [f32; 4], depth: Option<f32>) {
        self.calls.push(Call::Clear(framebuffer, viewport, color, depth));
    }

    fn bind_buffer(&mut self, target: u32, id: u32) {
        self.calls.push(Call::BindBuffer(target, id));
    }

    fn bind_buffer_range(&mut self, target: u32, index: u32, id: u32, offset: usize, size: usize) {
        self.calls
            .push(Call::BindBufferRange(target, index, id, offset, size));
    }

    fn bind_program(&mut self, id: u32) {
        self.calls.push(Call::BindProgram(id));
    }

    fn bind_vertex_array(&mut self, id: u32) {
        self.calls.push(Call::BindVertexArray(id));
    }

    fn bind_texture(&mut self, unit: u32, id: u32) {
        self.calls.push(Call::BindTexture(unit, id));
    }

    fn bind_framebuffer(&mut self, id: u32) {
        self.calls.push(Call::BindFramebuffer(id));
    }

    fn blit_framebuffer(&mut self, src: u32, dst: u32, src_rect: [i32; 4], dst_rect: [i32; 4]) {
        self.calls.push(Call::Blit(src, dst, src_rect, dst_rect));
    }

    fn set_uniform(&mut self, program: u32, location: i32, value: &UniformValue) {
        self.calls.push(Call::SetUniform(program, location, *value));
    }

    fn draw_indexed(&mut self, mode: u32, count: u32, base_vertex: u32, instances: u32) {
        self.calls
            .push(Call::DrawIndexed(mode, count, base_vertex, instances));
    }

    fn draw_arrays(&mut self, mode: u32, first: u32, count: u32, instances: u32) {
        self.calls.push(Call::DrawArrays(mode, first, count, instances));
    }
}
