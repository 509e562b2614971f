//! Ordered command lists with their fixed pipeline state.

use crate::command::{BindVertexArrayCommand, Command, DrawElementsCommand};
use crate::state::{ColorBlendState, DepthStencilState, RasterizerState};
use crate::types::Geometry;

/// An ordered list of commands replayed as a unit by
/// [`present`](crate::present).
///
/// Append order is replay order. The three pipeline states apply to every
/// command in the buffer. Not `Clone`: a buffer has exactly one owner.
#[derive(Debug)]
pub struct CommandBuffer {
    /// Empty the command list after each replay. State fields survive.
    pub presentation_clear: bool,
    /// Blending around each command.
    pub color_blend: ColorBlendState,
    /// Culling around each command.
    pub rasterizer: RasterizerState,
    /// Depth testing and writes around each command.
    pub depth_stencil: DepthStencilState,
    /// Commands in replay order.
    pub commands: Vec<Command>,
}

/// The name application code uses for a buffer handed to `present`.
pub type CommandQueue = CommandBuffer;

impl Default for CommandBuffer {
    fn default() -> Self {
        Self {
            presentation_clear: true,
            color_blend: ColorBlendState::default(),
            rasterizer: RasterizerState::default(),
            depth_stencil: DepthStencilState::default(),
            commands: Vec::new(),
        }
    }
}

impl CommandBuffer {
    /// An empty buffer with default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one command.
    pub fn push(&mut self, command: impl Into<Command>) -> &mut Self {
        self.commands.push(command.into());
        self
    }

    /// Bind `geometry`'s vertex array and draw all of it.
    pub fn draw_geometry(&mut self, geometry: &Geometry, instances: u32) -> &mut Self {
        self.push(BindVertexArrayCommand::new(geometry))
            .push(DrawElementsCommand::for_geometry(geometry, instances))
    }

    /// Drop all commands, keeping state.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands are recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Recorded commands in replay order.
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }
}

impl<C: Into<Command>> Extend<C> for CommandBuffer {
    fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
        self.commands.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a CommandBuffer {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{BindProgramCommand, BindTextureCommand};
    use crate::vertex::VertexFormat;

    #[test]
    fn new_buffer_clears_on_present_with_default_state() {
        let buffer = CommandBuffer::new();
        assert!(buffer.presentation_clear);
        assert!(buffer.is_empty());
        assert!(!buffer.depth_stencil.depth_test);
        assert!(buffer.depth_stencil.depth_write);
        assert!(!buffer.color_blend.enable);
        assert!(!buffer.rasterizer.cull_faces);
    }

    #[test]
    fn push_keeps_insertion_order() {
        let mut buffer = CommandBuffer::new();
        buffer
            .push(BindProgramCommand { id: 1 })
            .push(BindTextureCommand {
                unit: 0,
                id: 2,
                sampler: 0,
            })
            .push(BindProgramCommand { id: 3 });
        let ids: Vec<_> = buffer
            .iter()
            .map(|c| match c {
                Command::BindProgram(p) => p.id,
                Command::BindTexture(t) => t.id,
                _ => 0,
            })
            .collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn draw_geometry_appends_bind_then_draw() {
        let geometry = Geometry {
            vb: 1,
            eb: 2,
            vao: 7,
            format: VertexFormat::V3T2F32Ui16,
            num_elements: 6,
        };
        let mut buffer = CommandBuffer::new();
        buffer.draw_geometry(&geometry, 1);
        assert_eq!(buffer.len(), 2);
        assert_eq!(
            buffer.commands[0],
            Command::BindVertexArray(BindVertexArrayCommand { id: 7 })
        );
        assert!(matches!(
            buffer.commands[1],
            Command::DrawElements(DrawElementsCommand {
                num_elements: 6,
                num_instances: 1,
                ..
            })
        ));
    }

    #[test]
    fn clear_keeps_state() {
        let mut buffer = CommandBuffer::new();
        buffer.depth_stencil.depth_test = true;
        buffer.extend([BindProgramCommand { id: 1 }, BindProgramCommand { id: 2 }]);
        assert_eq!(buffer.len(), 2);
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.depth_stencil.depth_test);
    }
}
