//! Create/destroy pairs for every descriptor type.
//!
//! Each `create_*` performs one allocation transaction against the driver:
//! it either returns a fully populated descriptor or an invalid one, rolling
//! back anything it allocated on the way. Callers check `is_valid()`; the
//! command path never does. Each `destroy_*` releases the object and resets
//! the descriptor in place, so a second destroy is a no-op.

use bytemuck::Pod;

use crate::driver::{Driver, TextureDesc};
use crate::error::{Error, Result};
use crate::types::{
    Buffer, CreateBufferInfo, CreateFramebufferInfo, CreateGeometryInfo, CreatePipelineInfo,
    CreateRenderbufferInfo, CreateShaderInfo, CreateTextureArrayInfo, CreateTextureInfo,
    Framebuffer, Geometry, ProgramPipeline, Renderbuffer, Shader, Texture, INVALID_FRAMEBUFFER,
};

fn creation_failed(kind: &'static str, reason: String) {
    log::error!(target: "gl", "{}", Error::ResourceCreation { kind, reason });
}

/// Byte size of `width * height` pixels of `bpp` bytes, `None` on overflow.
fn image_size(width: u32, height: u32, bpp: usize) -> Option<usize> {
    (width as usize).checked_mul(height as usize)?.checked_mul(bpp)
}

/// Create a 2D texture, upload `info.pixels` if any, apply filtering and
/// optionally build mipmaps.
///
/// An unknown pixel format, or pixel data shorter than the image, yields an
/// invalid texture without touching the driver.
pub fn create_texture<D: Driver + ?Sized>(driver: &mut D, info: &CreateTextureInfo) -> Texture {
    let Some(format) = info.format.texture_format() else {
        log::warn!(
            target: "gl",
            "Texture {}x{} has unknown pixel format",
            info.width,
            info.height
        );
        return Texture::default();
    };

    let expected = image_size(info.width, info.height, info.format.bytes_per_pixel());
    if !info.pixels.is_empty() && expected.is_none_or(|size| info.pixels.len() < size) {
        log::warn!(
            target: "gl",
            "Texture {}x{} {:?} given {} bytes of pixels",
            info.width,
            info.height,
            info.format,
            info.pixels.len()
        );
        return Texture::default();
    }

    let pixels: &[u8] = &info.pixels;
    let layers: &[&[u8]] = if pixels.is_empty() {
        &[]
    } else {
        std::slice::from_ref(&pixels)
    };
    let desc = TextureDesc {
        target: glow::TEXTURE_2D,
        format,
        width: info.width,
        height: info.height,
        depth: 0,
        levels: info.levels.max(1),
        filter: info.filter,
        mipmaps: info.mipmaps,
        layers,
    };

    match driver.create_texture(&desc) {
        Ok(id) => Texture {
            id,
            target: glow::TEXTURE_2D,
            width: info.width,
            height: info.height,
            depth: 0,
        },
        Err(reason) => {
            creation_failed("texture", reason);
            Texture::default()
        }
    }
}

/// Create a 2D texture array with one layer per entry of `info.layers`.
/// At least `info.depth` layers are allocated.
pub fn create_texture_array<D: Driver + ?Sized>(
    driver: &mut D,
    info: &CreateTextureArrayInfo,
) -> Texture {
    let Some(format) = info.format.texture_format() else {
        log::warn!(
            target: "gl",
            "Texture array {}x{}x{} has unknown pixel format",
            info.width,
            info.height,
            info.depth
        );
        return Texture::default();
    };

    let expected = image_size(info.width, info.height, info.format.bytes_per_pixel());
    if let Some(short) = info
        .layers
        .iter()
        .position(|layer| expected.is_none_or(|size| layer.len() < size))
    {
        log::warn!(
            target: "gl",
            "Texture array layer {short} holds {} bytes, too few for {}x{} {:?}",
            info.layers[short].len(),
            info.width,
            info.height,
            info.format
        );
        return Texture::default();
    }

    let depth = info
        .depth
        .max(u32::try_from(info.layers.len()).unwrap_or(u32::MAX));
    let layers: Vec<&[u8]> = info.layers.iter().map(Vec::as_slice).collect();
    let desc = TextureDesc {
        target: glow::TEXTURE_2D_ARRAY,
        format,
        width: info.width,
        height: info.height,
        depth,
        levels: info.levels.max(1),
        filter: info.filter,
        mipmaps: info.mipmaps,
        layers: &layers,
    };

    match driver.create_texture(&desc) {
        Ok(id) => Texture {
            id,
            target: glow::TEXTURE_2D_ARRAY,
            width: info.width,
            height: info.height,
            depth,
        },
        Err(reason) => {
            creation_failed("texture array", reason);
            Texture::default()
        }
    }
}

/// Release a texture and reset the descriptor.
pub fn destroy_texture<D: Driver + ?Sized>(driver: &mut D, texture: &mut Texture) {
    if texture.is_valid() {
        driver.delete_texture(texture.id);
    }
    *texture = Texture::default();
}

/// Create a buffer of `info.size` bytes (at least `info.data.len()`),
/// filled from `info.data`.
pub fn create_buffer<D: Driver + ?Sized>(driver: &mut D, info: &CreateBufferInfo) -> Buffer {
    let size = info.size.max(info.data.len());
    let data = (!info.data.is_empty()).then_some(info.data.as_slice());
    match driver.create_buffer(size, data, info.usage) {
        Ok(id) => Buffer { id, size },
        Err(reason) => {
            creation_failed("buffer", reason);
            Buffer::default()
        }
    }
}

/// Overwrite part of a buffer with `data`, starting `offset` bytes in.
/// Writes that would run past the end are dropped with a warning.
pub fn update_buffer<D: Driver + ?Sized, T: Pod>(
    driver: &mut D,
    buffer: &Buffer,
    offset: usize,
    data: &[T],
) {
    let bytes: &[u8] = bytemuck::cast_slice(data);
    if !buffer.is_valid() {
        log::warn!(target: "gl", "Update of destroyed buffer ignored");
        return;
    }
    if offset.checked_add(bytes.len()).is_none_or(|end| end > buffer.size) {
        log::warn!(
            target: "gl",
            "Update of {} bytes at {offset} overruns buffer {} of {} bytes",
            bytes.len(),
            buffer.id,
            buffer.size
        );
        return;
    }
    driver.update_buffer(buffer.id, offset, bytes);
}

/// Release a buffer and reset the descriptor.
pub fn destroy_buffer<D: Driver + ?Sized>(driver: &mut D, buffer: &mut Buffer) {
    if buffer.is_valid() {
        driver.delete_buffer(buffer.id);
    }
    *buffer = Buffer::default();
}

/// Create a renderbuffer, multisampled when `info.samples > 0`.
pub fn create_renderbuffer<D: Driver + ?Sized>(
    driver: &mut D,
    info: &CreateRenderbufferInfo,
) -> Renderbuffer {
    let Some(format) = info.format.texture_format() else {
        log::warn!(
            target: "gl",
            "Renderbuffer {}x{} has unknown pixel format",
            info.width,
            info.height
        );
        return Renderbuffer::default();
    };
    match driver.create_renderbuffer(&format, info.width, info.height, info.samples) {
        Ok(id) => Renderbuffer {
            id,
            width: info.width,
            height: info.height,
            samples: info.samples,
        },
        Err(reason) => {
            creation_failed("renderbuffer", reason);
            Renderbuffer::default()
        }
    }
}

/// Release a renderbuffer and reset the descriptor.
pub fn destroy_renderbuffer<D: Driver + ?Sized>(driver: &mut D, renderbuffer: &mut Renderbuffer) {
    if renderbuffer.is_valid() {
        driver.delete_renderbuffer(renderbuffer.id);
    }
    *renderbuffer = Renderbuffer::default();
}

/// Create a framebuffer from an attachment list. The result records the
/// driver's completeness status; check [`Framebuffer::is_complete`] before
/// rendering into it.
pub fn create_framebuffer<D: Driver + ?Sized>(
    driver: &mut D,
    info: &CreateFramebufferInfo,
) -> Framebuffer {
    match driver.create_framebuffer(&info.attachments) {
        Ok((id, status)) => Framebuffer {
            id,
            width: info.width,
            height: info.height,
            status,
        },
        Err(reason) => {
            creation_failed("framebuffer", reason);
            Framebuffer::default()
        }
    }
}

/// Release a framebuffer and reset the descriptor to the invalid sentinel.
/// The default framebuffer is never deleted.
pub fn destroy_framebuffer<D: Driver + ?Sized>(driver: &mut D, framebuffer: &mut Framebuffer) {
    if framebuffer.is_valid() && framebuffer.id != 0 {
        driver.delete_framebuffer(framebuffer.id);
    }
    *framebuffer = Framebuffer {
        id: INVALID_FRAMEBUFFER,
        ..Framebuffer::default()
    };
}

/// Compile a shader stage, returning the compiler log on failure.
pub fn try_create_shader<D: Driver + ?Sized>(
    driver: &mut D,
    info: &CreateShaderInfo,
) -> Result<Shader> {
    let stage = info.ty.target();
    if stage == 0 {
        return Err(Error::ShaderCompile("unknown shader type".into()));
    }
    let id = driver
        .create_shader(stage, &info.source)
        .map_err(Error::ShaderCompile)?;
    Ok(Shader { id, target: stage })
}

/// Compile a shader stage.
///
/// A compile failure is fatal: it is logged and the process exits with a
/// failure status. Use [`try_create_shader`] to handle it instead.
pub fn create_shader<D: Driver + ?Sized>(driver: &mut D, info: &CreateShaderInfo) -> Shader {
    match try_create_shader(driver, info) {
        Ok(shader) => shader,
        Err(e) => {
            log::error!(target: "gl", "CRITICAL {:?} {e}", info.ty);
            std::process::exit(1);
        }
    }
}

/// Release a shader and reset the descriptor.
pub fn destroy_shader<D: Driver + ?Sized>(driver: &mut D, shader: &mut Shader) {
    if shader.is_valid() {
        driver.delete_shader(shader.id);
    }
    *shader = Shader::default();
}

/// Link shaders into a program and reflect its uniforms, attributes and
/// uniform blocks.
pub fn try_create_program_pipeline<D: Driver + ?Sized>(
    driver: &mut D,
    info: &CreatePipelineInfo,
) -> Result<ProgramPipeline> {
    let stages: Vec<u32> = info
        .shaders
        .iter()
        .filter(|s| s.is_valid())
        .map(|s| s.id)
        .collect();
    let id = driver.create_program(&stages).map_err(Error::ProgramLink)?;

    let uniforms = driver.program_uniforms(id);
    for u in &uniforms {
        log::debug!(target: "gl", "Uniform {}, Location {}", u.name, u.location);
    }
    let attributes = driver.program_attributes(id);
    for a in &attributes {
        log::debug!(target: "gl", "Attribute {}, Location {}", a.name, a.location);
    }
    let uniform_blocks = driver.program_uniform_blocks(id);
    for b in &uniform_blocks {
        log::debug!(target: "gl", "Uniform block {}, Binding {}", b.name, b.binding);
    }

    Ok(ProgramPipeline {
        id,
        uniforms,
        attributes,
        uniform_blocks,
    })
}

/// Link shaders into a program. A link failure is logged and yields an
/// invalid pipeline.
pub fn create_program_pipeline<D: Driver + ?Sized>(
    driver: &mut D,
    info: &CreatePipelineInfo,
) -> ProgramPipeline {
    try_create_program_pipeline(driver, info).unwrap_or_else(|e| {
        log::error!(target: "gl", "{e}");
        ProgramPipeline::default()
    })
}

/// Release a program and reset the descriptor.
pub fn destroy_program_pipeline<D: Driver + ?Sized>(driver: &mut D, pipeline: &mut ProgramPipeline) {
    if pipeline.is_valid() {
        driver.delete_program(pipeline.id);
    }
    *pipeline = ProgramPipeline::default();
}

/// Upload a mesh and bind it into a vertex array.
///
/// `num_elements` is the index count for indexed formats and the vertex
/// count for [`VertexFormat::V3F32`](crate::VertexFormat::V3F32). An unknown
/// format or short vertex/index data yields an invalid geometry.
pub fn create_geometry<D: Driver + ?Sized>(driver: &mut D, info: &CreateGeometryInfo) -> Geometry {
    let Some(layout) = info.format.layout() else {
        log::warn!(target: "gl", "Unknown vertex format for geometry");
        return Geometry::default();
    };

    let vertex_bytes = info.vertices_num.saturating_mul(info.format.stride());
    if info.vertices.len() < vertex_bytes {
        log::warn!(
            target: "gl",
            "Geometry declares {} vertices ({vertex_bytes} bytes) but holds {} bytes",
            info.vertices_num,
            info.vertices.len()
        );
        return Geometry::default();
    }
    let indexed = info.format.has_indices();
    if indexed && info.indices.len() < info.indices_num {
        log::warn!(
            target: "gl",
            "Geometry declares {} indices but holds {}",
            info.indices_num,
            info.indices.len()
        );
        return Geometry::default();
    }

    let vb = match driver.create_buffer(
        vertex_bytes,
        Some(&info.vertices[..vertex_bytes]),
        glow::STATIC_DRAW,
    ) {
        Ok(id) => id,
        Err(reason) => {
            creation_failed("vertex buffer", reason);
            return Geometry::default();
        }
    };

    let eb = if indexed {
        let indices: &[u8] = bytemuck::cast_slice(&info.indices[..info.indices_num]);
        match driver.create_buffer(indices.len(), Some(indices), glow::STATIC_DRAW) {
            Ok(id) => id,
            Err(reason) => {
                driver.delete_buffer(vb);
                creation_failed("index buffer", reason);
                return Geometry::default();
            }
        }
    } else {
        0
    };

    let vao = match driver.create_vertex_array(&layout, vb, eb) {
        Ok(id) => id,
        Err(reason) => {
            driver.delete_buffer(vb);
            if eb != 0 {
                driver.delete_buffer(eb);
            }
            creation_failed("vertex array", reason);
            return Geometry::default();
        }
    };

    let num_elements = if indexed {
        info.indices_num
    } else {
        info.vertices_num
    };

    Geometry {
        vb,
        eb,
        vao,
        format: info.format,
        num_elements: u32::try_from(num_elements).unwrap_or(u32::MAX),
    }
}

/// Release a geometry's buffers and vertex array and reset the descriptor.
pub fn destroy_geometry<D: Driver + ?Sized>(driver: &mut D, geometry: &mut Geometry) {
    if geometry.vb != 0 {
        driver.delete_buffer(geometry.vb);
    }
    if geometry.eb != 0 {
        driver.delete_buffer(geometry.eb);
    }
    if geometry.vao != 0 {
        driver.delete_vertex_array(geometry.vao);
    }
    *geometry = Geometry::default();
}
