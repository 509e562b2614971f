//! Fixed pipeline state carried by a [`CommandBuffer`](crate::CommandBuffer)
//! and applied around every command it replays.

use crate::driver::Driver;

/// Color blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBlendState {
    /// Enable blending.
    pub enable: bool,
    /// Source blend factor.
    pub sfactor: u32,
    /// Destination blend factor.
    pub dfactor: u32,
}

impl Default for ColorBlendState {
    fn default() -> Self {
        Self {
            enable: false,
            sfactor: glow::ONE,
            dfactor: glow::ONE,
        }
    }
}

impl ColorBlendState {
    /// Turn blending on if requested.
    pub fn apply<D: Driver + ?Sized>(&self, driver: &mut D) {
        if self.enable {
            driver.enable(glow::BLEND);
            driver.blend_func(self.sfactor, self.dfactor);
        }
    }

    /// Back to the default: blending off.
    pub fn revert<D: Driver + ?Sized>(&self, driver: &mut D) {
        driver.disable(glow::BLEND);
    }
}

/// Face culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterizerState {
    /// Enable face culling.
    pub cull_faces: bool,
    /// Faces to cull.
    pub cull_mode: u32,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            cull_faces: false,
            cull_mode: glow::BACK,
        }
    }
}

impl RasterizerState {
    /// Turn culling on if requested.
    pub fn apply<D: Driver + ?Sized>(&self, driver: &mut D) {
        if self.cull_faces {
            driver.enable(glow::CULL_FACE);
            driver.cull_face(self.cull_mode);
        }
    }

    /// Back to the default: culling off.
    pub fn revert<D: Driver + ?Sized>(&self, driver: &mut D) {
        driver.disable(glow::CULL_FACE);
    }
}

/// Depth testing and depth writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    /// Enable depth testing.
    pub depth_test: bool,
    /// Also decides whether [`ClearCommand`](crate::ClearCommand) clears depth.
    pub depth_write: bool,
    /// Depth comparison used when testing.
    pub depth_func: u32,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test: false,
            depth_write: true,
            depth_func: glow::LESS,
        }
    }
}

impl DepthStencilState {
    /// Enable the depth test if requested; the depth mask is always set.
    pub fn apply<D: Driver + ?Sized>(&self, driver: &mut D) {
        if self.depth_test {
            driver.enable(glow::DEPTH_TEST);
            driver.depth_func(self.depth_func);
        }
        driver.depth_mask(self.depth_write);
    }

    /// Back to the default: writes on, test off.
    pub fn revert<D: Driver + ?Sized>(&self, driver: &mut D) {
        driver.depth_mask(true);
        driver.disable(glow::DEPTH_TEST);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingDriver};

    #[test]
    fn disabled_states_only_touch_depth_mask() {
        let mut driver = RecordingDriver::default();
        ColorBlendState::default().apply(&mut driver);
        RasterizerState::default().apply(&mut driver);
        DepthStencilState::default().apply(&mut driver);
        assert_eq!(driver.calls, vec![Call::DepthMask(true)]);
    }

    #[test]
    fn enabled_states_set_their_parameters() {
        let mut driver = RecordingDriver::default();
        ColorBlendState {
            enable: true,
            sfactor: glow::SRC_ALPHA,
            dfactor: glow::ONE_MINUS_SRC_ALPHA,
        }
        .apply(&mut driver);
        RasterizerState {
            cull_faces: true,
            cull_mode: glow::FRONT,
        }
        .apply(&mut driver);
        DepthStencilState {
            depth_test: true,
            depth_write: false,
            depth_func: glow::LEQUAL,
        }
        .apply(&mut driver);

        assert_eq!(
            driver.calls,
            vec![
                Call::Enable(glow::BLEND),
                Call::BlendFunc(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA),
                Call::Enable(glow::CULL_FACE),
                Call::CullFace(glow::FRONT),
                Call::Enable(glow::DEPTH_TEST),
                Call::DepthFunc(glow::LEQUAL),
                Call::DepthMask(false),
            ]
        );
    }

    #[test]
    fn revert_restores_defaults_regardless_of_state() {
        let mut driver = RecordingDriver::default();
        let depth = DepthStencilState {
            depth_test: true,
            depth_write: false,
            depth_func: glow::GREATER,
        };
        depth.revert(&mut driver);
        RasterizerState::default().revert(&mut driver);
        ColorBlendState::default().revert(&mut driver);
        assert_eq!(
            driver.calls,
            vec![
                Call::DepthMask(true),
                Call::Disable(glow::DEPTH_TEST),
                Call::Disable(glow::CULL_FACE),
                Call::Disable(glow::BLEND),
            ]
        );
    }
}
