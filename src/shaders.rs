//! Shader compilation, program linking and interface reflection.
//!
//! These are the raw GL halves of the shader and pipeline factories; the
//! [`GlowDriver`](crate::GlowDriver) wraps them behind the driver trait.

use glow::HasContext;

use crate::types::{ProgramResourceInfo, UniformBlockInfo};

/// Compile a single shader stage from source.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
///
/// # Errors
///
/// Returns the compiler log if the stage fails to compile. The shader
/// object is deleted in that case.
pub unsafe fn compile_shader(
    gl: &glow::Context,
    stage: u32,
    source: &str,
) -> Result<glow::Shader, String> {
    unsafe {
        let shader = gl.create_shader(stage)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(log);
        }

        Ok(shader)
    }
}

/// Link compiled stages into a program.
///
/// The stages are detached again after a successful link but not deleted;
/// they stay owned by their [`Shader`](crate::Shader) descriptors.
///
/// # Safety
///
/// Requires a valid, current OpenGL context, and every handle in `shaders`
/// must be a live shader object of that context.
///
/// # Errors
///
/// Returns the linker log if linking fails. The program object is deleted
/// in that case.
pub unsafe fn link_program(
    gl: &glow::Context,
    shaders: &[glow::Shader],
) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program()?;
        for &shader in shaders {
            gl.attach_shader(program, shader);
        }
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(log);
        }

        for &shader in shaders {
            gl.detach_shader(program, shader);
        }

        Ok(program)
    }
}

/// Array uniforms are reported as `name[0]`; lookups use the bare name.
fn base_name(name: &str) -> String {
    name.strip_suffix("[0]").unwrap_or(name).to_owned()
}

/// Active uniforms that have a location. Members of uniform blocks have
/// none and are reported through [`uniform_blocks`] instead.
///
/// # Safety
///
/// Requires a valid, current OpenGL context and a linked `program`.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub unsafe fn uniforms(gl: &glow::Context, program: glow::Program) -> Vec<ProgramResourceInfo> {
    unsafe {
        let count = gl.get_active_uniforms(program);
        (0..count)
            .filter_map(|index| {
                let active = gl.get_active_uniform(program, index)?;
                let location = gl.get_uniform_location(program, &active.name)?;
                Some(ProgramResourceInfo {
                    name: base_name(&active.name),
                    program: program.0.get(),
                    location: location.0 as i32,
                    count: active.size.max(1) as u32,
                    ty: active.utype,
                })
            })
            .collect()
    }
}

/// Active vertex inputs. Built-ins such as `gl_VertexID` have no location
/// and are skipped.
///
/// # Safety
///
/// Requires a valid, current OpenGL context and a linked `program`.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub unsafe fn attributes(gl: &glow::Context, program: glow::Program) -> Vec<ProgramResourceInfo> {
    unsafe {
        let count = gl.get_active_attributes(program);
        (0..count)
            .filter_map(|index| {
                let active = gl.get_active_attribute(program, index)?;
                let location = gl.get_attrib_location(program, &active.name)?;
                Some(ProgramResourceInfo {
                    name: base_name(&active.name),
                    program: program.0.get(),
                    location: location as i32,
                    count: active.size.max(1) as u32,
                    ty: active.atype,
                })
            })
            .collect()
    }
}

/// Active uniform blocks with their binding points and sizes.
///
/// # Safety
///
/// Requires a valid, current OpenGL context and a linked `program`.
#[allow(clippy::cast_sign_loss)]
pub unsafe fn uniform_blocks(gl: &glow::Context, program: glow::Program) -> Vec<UniformBlockInfo> {
    unsafe {
        let count = gl
            .get_program_parameter_i32(program, glow::ACTIVE_UNIFORM_BLOCKS)
            .max(0) as u32;
        (0..count)
            .map(|index| UniformBlockInfo {
                name: gl.get_active_uniform_block_name(program, index),
                program: program.0.get(),
                index,
                binding: gl
                    .get_active_uniform_block_parameter_i32(
                        program,
                        index,
                        glow::UNIFORM_BLOCK_BINDING,
                    )
                    .max(0) as u32,
                size: gl
                    .get_active_uniform_block_parameter_i32(
                        program,
                        index,
                        glow::UNIFORM_BLOCK_DATA_SIZE,
                    )
                    .max(0) as u32,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_suffix_is_stripped() {
        assert_eq!(base_name("lights[0]"), "lights");
        assert_eq!(base_name("projection_view"), "projection_view");
        assert_eq!(base_name("bones[0].weight"), "bones[0].weight");
    }
}
