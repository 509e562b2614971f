//! Replay of command buffers against a [`Driver`].

use crate::command::{Command, DrawElementsCommand, SetUniformCommand};
use crate::driver::Driver;
use crate::queue::CommandBuffer;

/// Replay every buffer in `queues`, in order.
///
/// Each command is bracketed by the buffer's blend, rasterizer and
/// depth-stencil state: applied in that order before it, reverted in the
/// reverse order after it. Commands are neither reordered nor merged. A
/// buffer with `presentation_clear` set is emptied once its commands have
/// run.
///
/// Nothing here fails. Unresolved uniforms are skipped; stale handles are
/// passed to the driver as recorded.
pub fn present<D: Driver + ?Sized>(driver: &mut D, queues: &mut [&mut CommandBuffer]) {
    for queue in queues.iter_mut() {
        let queue: &mut CommandBuffer = queue;
        replay(driver, queue);

        if queue.presentation_clear {
            queue.clear();
        }
    }
}

fn replay<D: Driver + ?Sized>(driver: &mut D, queue: &CommandBuffer) {
    for command in &queue.commands {
        queue.color_blend.apply(driver);
        queue.rasterizer.apply(driver);
        queue.depth_stencil.apply(driver);

        dispatch(driver, command, queue);

        queue.depth_stencil.revert(driver);
        queue.rasterizer.revert(driver);
        queue.color_blend.revert(driver);
    }
}

/// Issue the single driver call a command stands for.
fn dispatch<D: Driver + ?Sized>(driver: &mut D, command: &Command, queue: &CommandBuffer) {
    match command {
        Command::Clear(clear) => {
            let depth = queue.depth_stencil.depth_write.then_some(clear.depth);
            driver.clear(clear.framebuffer, clear.viewport, clear.color, depth);
        }
        Command::BindBuffer(bind) => match u32::try_from(bind.block_index) {
            Ok(index) => {
                driver.bind_buffer_range(bind.ty.target(), index, bind.id, bind.offset, bind.size);
            }
            Err(_) => driver.bind_buffer(bind.ty.target(), bind.id),
        },
        Command::BindProgram(bind) => driver.bind_program(bind.id),
        Command::BindVertexArray(bind) => driver.bind_vertex_array(bind.id),
        Command::BindTexture(bind) => driver.bind_texture(bind.unit, bind.id),
        Command::BindFramebuffer(bind) => driver.bind_framebuffer(bind.id),
        Command::BlitFramebuffer(blit) => driver.blit_framebuffer(
            blit.src,
            blit.dst,
            [blit.src_x, blit.src_y, blit.src_w, blit.src_h],
            [blit.dst_x, blit.dst_y, blit.dst_w, blit.dst_h],
        ),
        Command::SetUniform(set) => dispatch_uniform(driver, set),
        Command::DrawElements(draw) => dispatch_draw(driver, draw),
    }
}

fn dispatch_uniform<D: Driver + ?Sized>(driver: &mut D, set: &SetUniformCommand) {
    if !set.is_resolved() {
        return;
    }
    driver.set_uniform(set.program, set.location, &set.value);
}

fn dispatch_draw<D: Driver + ?Sized>(driver: &mut D, draw: &DrawElementsCommand) {
    if draw.format.has_indices() {
        driver.draw_indexed(draw.mode, draw.num_elements, draw.base_element, draw.num_instances);
    } else {
        driver.draw_arrays(draw.mode, draw.base_element, draw.num_elements, draw.num_instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{
        BindBufferCommand, BindFramebufferCommand, BindProgramCommand, BindTextureCommand,
        BindVertexArrayCommand, BlitFramebufferCommand, ClearCommand, UniformValue,
    };
    use crate::testing::{Call, RecordingDriver};
    use crate::types::{Buffer, BufferType, Framebuffer, Geometry, ProgramPipeline, ProgramResourceInfo};
    use crate::vertex::VertexFormat;

    fn cube() -> Geometry {
        Geometry {
            vb: 1,
            eb: 2,
            vao: 3,
            format: VertexFormat::V3T2N3F32Ui16,
            num_elements: 36,
        }
    }

    fn pipeline() -> ProgramPipeline {
        ProgramPipeline {
            id: 4,
            uniforms: vec![ProgramResourceInfo {
                name: "mvp".into(),
                program: 4,
                location: 0,
                count: 1,
                ty: glow::FLOAT_MAT4,
            }],
            attributes: Vec::new(),
            uniform_blocks: Vec::new(),
        }
    }

    fn scene(depth_write: bool) -> CommandBuffer {
        let mut buffer = CommandBuffer::new();
        buffer.depth_stencil.depth_test = true;
        buffer.depth_stencil.depth_write = depth_write;
        buffer
            .push(ClearCommand::new(
                &Framebuffer::default_framebuffer(640, 480),
                [0.4, 0.4, 0.4, 1.0],
            ))
            .push(BindProgramCommand::new(&pipeline()))
            .draw_geometry(&cube(), 1);
        buffer
    }

    #[test]
    fn empty_queue_list_makes_no_calls() {
        let mut driver = RecordingDriver::default();
        present(&mut driver, &mut []);
        assert!(driver.calls.is_empty());
    }

    #[test]
    fn every_command_dispatches_once_in_order() {
        let mut driver = RecordingDriver::default();
        let mut buffer = CommandBuffer::new();
        buffer.color_blend.enable = true;
        buffer.rasterizer.cull_faces = true;
        buffer
            .push(BindFramebufferCommand { id: 8 })
            .push(BindProgramCommand { id: 4 })
            .push(BindTextureCommand {
                unit: 2,
                id: 5,
                sampler: 99,
            })
            .push(BindBufferCommand::new(BufferType::Uniform, &Buffer { id: 6, size: 64 }))
            .push(SetUniformCommand::new(&pipeline(), "mvp", [[1.0; 4]; 4]))
            .draw_geometry(&cube(), 1);

        present(&mut driver, &mut [&mut buffer]);

        assert_eq!(
            driver.dispatched(),
            vec![
                Call::BindFramebuffer(8),
                Call::BindProgram(4),
                Call::BindTexture(2, 5),
                Call::BindBuffer(glow::UNIFORM_BUFFER, 6),
                Call::SetUniform(4, 0, UniformValue::Mat4([[1.0; 4]; 4])),
                Call::BindVertexArray(3),
                Call::DrawIndexed(glow::TRIANGLES, 36, 0, 1),
            ]
        );
    }

    #[test]
    fn state_brackets_each_command() {
        let mut driver = RecordingDriver::default();
        let mut buffer = CommandBuffer::new();
        buffer.push(BindProgramCommand { id: 1 }).push(BindProgramCommand { id: 2 });

        present(&mut driver, &mut [&mut buffer]);

        let bracket = |id| {
            vec![
                Call::DepthMask(true),
                Call::BindProgram(id),
                Call::DepthMask(true),
                Call::Disable(glow::DEPTH_TEST),
                Call::Disable(glow::CULL_FACE),
                Call::Disable(glow::BLEND),
            ]
        };
        let expected: Vec<_> = bracket(1).into_iter().chain(bracket(2)).collect();
        assert_eq!(driver.calls, expected);
    }

    #[test]
    fn presentation_clear_empties_buffer_but_keeps_state() {
        let mut driver = RecordingDriver::default();
        let mut buffer = scene(true);
        present(&mut driver, &mut [&mut buffer]);
        assert!(buffer.is_empty());
        assert!(buffer.depth_stencil.depth_test);
    }

    #[test]
    fn retained_buffer_replays_identically() {
        let mut driver = RecordingDriver::default();
        let mut buffer = scene(true);
        buffer.presentation_clear = false;
        let before = buffer.commands.clone();

        present(&mut driver, &mut [&mut buffer]);
        let first = driver.dispatched();
        driver.calls.clear();
        present(&mut driver, &mut [&mut buffer]);

        assert_eq!(buffer.commands, before);
        assert_eq!(driver.dispatched(), first);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn depth_is_cleared_only_when_depth_write_is_on() {
        let mut driver = RecordingDriver::default();
        present(&mut driver, &mut [&mut scene(true)]);
        assert_eq!(
            driver.dispatched()[0],
            Call::Clear(0, [0.0, 0.0, 640.0, 480.0], [0.4, 0.4, 0.4, 1.0], Some(1.0))
        );

        let mut driver = RecordingDriver::default();
        present(&mut driver, &mut [&mut scene(false)]);
        assert_eq!(
            driver.dispatched()[0],
            Call::Clear(0, [0.0, 0.0, 640.0, 480.0], [0.4, 0.4, 0.4, 1.0], None)
        );
    }

    #[test]
    fn depth_tested_scene_enables_depth_test_around_draw() {
        let mut driver = RecordingDriver::default();
        present(&mut driver, &mut [&mut scene(true)]);
        let draw = driver
            .calls
            .iter()
            .position(|c| matches!(c, Call::DrawIndexed(..)));
        assert!(draw.is_some());
        if let Some(draw) = draw {
            assert_eq!(driver.calls[draw - 3], Call::Enable(glow::DEPTH_TEST));
            assert_eq!(driver.calls[draw - 2], Call::DepthFunc(glow::LESS));
            assert_eq!(driver.calls[draw - 1], Call::DepthMask(true));
            assert_eq!(driver.calls[draw + 2], Call::Disable(glow::DEPTH_TEST));
        }
    }

    #[test]
    fn unresolved_uniform_is_a_no_op() {
        let mut driver = RecordingDriver::default();
        let mut buffer = CommandBuffer::new();
        buffer.push(SetUniformCommand::new(&pipeline(), "missing", 1.0));
        present(&mut driver, &mut [&mut buffer]);
        assert!(driver.dispatched().is_empty());
    }

    #[test]
    fn array_uniform_uploads_one_value() {
        let mut arrayed = pipeline();
        arrayed.uniforms[0].name = "bones".into();
        arrayed.uniforms[0].count = 16;

        let set = SetUniformCommand::new(&arrayed, "bones", [[2.0; 4]; 4]);
        assert_eq!(set.count, 16);

        let mut driver = RecordingDriver::default();
        let mut buffer = CommandBuffer::new();
        buffer.push(set);
        present(&mut driver, &mut [&mut buffer]);
        assert_eq!(
            driver.dispatched(),
            [Call::SetUniform(4, 0, UniformValue::Mat4([[2.0; 4]; 4]))]
        );
    }

    #[test]
    fn resolved_block_binds_ranged() {
        let mut driver = RecordingDriver::default();
        let mut buffer = CommandBuffer::new();
        buffer.push(BindBufferCommand {
            ty: BufferType::Uniform,
            id: 6,
            block_index: 1,
            offset: 0,
            size: 384,
        });
        present(&mut driver, &mut [&mut buffer]);
        assert_eq!(
            driver.dispatched(),
            vec![Call::BindBufferRange(glow::UNIFORM_BUFFER, 1, 6, 0, 384)]
        );
    }

    #[test]
    fn unindexed_format_draws_arrays_with_mode() {
        let mut driver = RecordingDriver::default();
        let mut buffer = CommandBuffer::new();
        buffer.push(DrawElementsCommand {
            format: VertexFormat::V3F32,
            mode: glow::LINES,
            base_element: 2,
            num_elements: 10,
            num_instances: 3,
        });
        present(&mut driver, &mut [&mut buffer]);
        assert_eq!(driver.dispatched(), vec![Call::DrawArrays(glow::LINES, 2, 10, 3)]);
    }

    #[test]
    fn blit_passes_recorded_rects() {
        let src = Framebuffer {
            id: 1,
            width: 100,
            height: 50,
            status: glow::FRAMEBUFFER_COMPLETE,
        };
        let dst = Framebuffer::default_framebuffer(200, 100);
        let mut driver = RecordingDriver::default();
        let mut buffer = CommandBuffer::new();
        buffer.push(BlitFramebufferCommand::new(&src, &dst));
        present(&mut driver, &mut [&mut buffer]);
        assert_eq!(
            driver.dispatched(),
            vec![Call::Blit(1, 0, [0, 0, 100, 50], [0, 0, 200, 100])]
        );
    }

    #[test]
    fn queues_replay_in_list_order() {
        let mut driver = RecordingDriver::default();
        let mut first = CommandBuffer::new();
        first.push(BindVertexArrayCommand { id: 1 });
        let mut second = CommandBuffer::new();
        second.push(BindVertexArrayCommand { id: 2 });
        present(&mut driver, &mut [&mut second, &mut first]);
        assert_eq!(
            driver.dispatched(),
            vec![Call::BindVertexArray(2), Call::BindVertexArray(1)]
        );
    }
}
