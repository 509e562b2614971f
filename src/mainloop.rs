//! Fixed-timestep frame scheduling.
//!
//! The loop owns no window. It drives whatever implements [`Surface`],
//! running simulation steps at a fixed rate and one render callback per
//! frame.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use crate::types::Framebuffer;

/// The window side of the loop: a drawable that can be presented and
/// pumped for events.
pub trait Surface {
    /// Current size of the default framebuffer in pixels.
    fn framebuffer_size(&self) -> (u32, u32);
    /// Whether the user asked to close the window.
    fn should_close(&self) -> bool;
    /// Present the frame just rendered.
    fn swap_buffers(&mut self);
    /// Process pending window events.
    fn poll_events(&mut self);
}

/// Timing parameters for [`Mainloop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainloopConfig {
    /// Length of one simulation step.
    pub timestep: Duration,
    /// Longest frame time credited to the accumulator. Longer stalls are
    /// dropped rather than replayed as a burst of steps.
    pub max_frame_time: Duration,
}

impl Default for MainloopConfig {
    fn default() -> Self {
        Self {
            timestep: Duration::from_millis(16),
            max_frame_time: Duration::from_millis(300),
        }
    }
}

/// Frame-time accumulator.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    config: MainloopConfig,
    accumulator: Duration,
    total_steps: u64,
}

impl FixedTimestep {
    /// An empty accumulator.
    pub fn new(config: MainloopConfig) -> Self {
        Self {
            config,
            accumulator: Duration::ZERO,
            total_steps: 0,
        }
    }

    /// Credit one frame's elapsed time and return how many steps are now
    /// due. A zero timestep never schedules steps. More than `u32::MAX` due
    /// steps are reported as `u32::MAX` and the rest stay accumulated.
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        let timestep = self.config.timestep;
        if timestep.is_zero() {
            return 0;
        }
        if frame_time > self.config.max_frame_time {
            log::debug!(
                target: "app",
                "Frame took {frame_time:?}, clamped to {:?}",
                self.config.max_frame_time
            );
        }
        self.accumulator += frame_time.min(self.config.max_frame_time);

        let due = self.accumulator.as_nanos() / timestep.as_nanos();
        let steps = u32::try_from(due).unwrap_or(u32::MAX);
        self.accumulator = self.accumulator.saturating_sub(timestep.saturating_mul(steps));
        self.total_steps += u64::from(steps);
        steps
    }

    /// Fraction of a step left in the accumulator, in `[0, 1)`.
    pub fn alpha(&self) -> f32 {
        if self.config.timestep.is_zero() {
            return 0.0;
        }
        self.accumulator.as_secs_f32() / self.config.timestep.as_secs_f32()
    }

    /// Steps scheduled since creation.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }
}

/// Runs simulation steps and frames until the surface closes.
#[derive(Debug, Clone, Default)]
pub struct Mainloop {
    config: MainloopConfig,
}

impl Mainloop {
    /// A loop with the given timing.
    pub fn new(config: MainloopConfig) -> Self {
        Self { config }
    }

    /// Timing the loop runs with.
    pub fn config(&self) -> &MainloopConfig {
        &self.config
    }

    /// Run until `surface` asks to close or `on_frame` breaks, timing
    /// frames with [`Instant::now`]. Returns the number of steps run.
    ///
    /// Each iteration runs the due `on_step` calls, then `on_frame` with the
    /// default framebuffer at the surface's current size, then swaps and
    /// polls.
    pub fn run<S, Step, Frame>(&mut self, surface: &mut S, on_step: Step, on_frame: Frame) -> u64
    where
        S: Surface + ?Sized,
        Step: FnMut(),
        Frame: FnMut(&Framebuffer) -> ControlFlow<()>,
    {
        self.run_with_clock(surface, Instant::now, on_step, on_frame)
    }

    /// [`run`](Self::run) with a caller-supplied clock.
    pub fn run_with_clock<S, Clock, Step, Frame>(
        &mut self,
        surface: &mut S,
        mut now: Clock,
        mut on_step: Step,
        mut on_frame: Frame,
    ) -> u64
    where
        S: Surface + ?Sized,
        Clock: FnMut() -> Instant,
        Step: FnMut(),
        Frame: FnMut(&Framebuffer) -> ControlFlow<()>,
    {
        log::info!(
            target: "app",
            "Mainloop started, timestep {:?}",
            self.config.timestep
        );

        let mut timestep = FixedTimestep::new(self.config);
        let mut current = now();
        let mut frames = 0u64;

        while !surface.should_close() {
            let last = current;
            current = now();

            for _ in 0..timestep.advance(current.saturating_duration_since(last)) {
                on_step();
            }

            let (width, height) = surface.framebuffer_size();
            let flow = on_frame(&Framebuffer::default_framebuffer(width, height));
            frames += 1;

            surface.swap_buffers();
            surface.poll_events();

            if flow.is_break() {
                break;
            }
        }

        log::info!(
            target: "app",
            "Mainloop stopped after {frames} frames and {} steps",
            timestep.total_steps()
        );
        timestep.total_steps()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Default)]
    struct FakeSurface {
        size: (u32, u32),
        close_after: Option<u32>,
        swaps: u32,
        polls: u32,
    }

    impl Surface for FakeSurface {
        fn framebuffer_size(&self) -> (u32, u32) {
            self.size
        }

        fn should_close(&self) -> bool {
            self.close_after.is_some_and(|n| self.polls >= n)
        }

        fn swap_buffers(&mut self) {
            self.swaps += 1;
        }

        fn poll_events(&mut self) {
            self.polls += 1;
        }
    }

    /// A clock that moves forward by `step` on every read.
    fn ticking(step: Duration) -> impl FnMut() -> Instant {
        let start = Instant::now();
        let ticks = Cell::new(0u32);
        move || {
            let t = ticks.get();
            ticks.set(t + 1);
            start + step * t
        }
    }

    #[test]
    fn accumulator_carries_remainder() {
        let mut timestep = FixedTimestep::new(MainloopConfig::default());
        assert_eq!(timestep.advance(Duration::from_millis(10)), 0);
        assert_eq!(timestep.advance(Duration::from_millis(10)), 1);
        assert_eq!(timestep.advance(Duration::from_millis(44)), 3);
        assert_eq!(timestep.total_steps(), 4);
        assert!(timestep.alpha().abs() < 1e-6);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut timestep = FixedTimestep::new(MainloopConfig::default());
        assert_eq!(timestep.advance(Duration::from_secs(5)), 18);
        let alpha = timestep.alpha();
        assert!((alpha - 0.75).abs() < 1e-4, "{alpha}");
    }

    #[test]
    fn zero_timestep_schedules_nothing() {
        let mut timestep = FixedTimestep::new(MainloopConfig {
            timestep: Duration::ZERO,
            ..MainloopConfig::default()
        });
        assert_eq!(timestep.advance(Duration::from_millis(100)), 0);
        assert!(timestep.alpha().abs() < f32::EPSILON);
    }

    #[test]
    fn tiny_timestep_saturates_step_count() {
        let mut timestep = FixedTimestep::new(MainloopConfig {
            timestep: Duration::from_nanos(1),
            max_frame_time: Duration::from_secs(10),
        });
        assert_eq!(timestep.advance(Duration::from_secs(5)), u32::MAX);
        assert_eq!(timestep.total_steps(), u64::from(u32::MAX));
        // 5s minus u32::MAX ns is still owed.
        assert_eq!(timestep.advance(Duration::ZERO), 705_032_705);
        assert_eq!(timestep.advance(Duration::from_nanos(3)), 3);
        assert_eq!(timestep.total_steps(), 5_000_000_003);
    }

    #[test]
    fn closed_surface_runs_no_frames() {
        let mut surface = FakeSurface {
            close_after: Some(0),
            ..FakeSurface::default()
        };
        let mut frames = 0;
        let steps = Mainloop::default().run(
            &mut surface,
            || {},
            |_| {
                frames += 1;
                ControlFlow::Continue(())
            },
        );
        assert_eq!((steps, frames, surface.swaps), (0, 0, 0));
    }

    #[test]
    fn frames_see_surface_size_and_steps_follow_clock() {
        let mut surface = FakeSurface {
            size: (1440, 1080),
            close_after: Some(5),
            ..FakeSurface::default()
        };
        let mut steps_seen = 0;
        let mut sizes = Vec::new();
        let total = Mainloop::default().run_with_clock(
            &mut surface,
            ticking(Duration::from_millis(32)),
            || steps_seen += 1,
            |fb| {
                sizes.push((fb.id, fb.width, fb.height));
                ControlFlow::Continue(())
            },
        );
        assert_eq!(surface.swaps, 5);
        assert_eq!(sizes, vec![(0, 1440, 1080); 5]);
        assert_eq!(total, 10);
        assert_eq!(steps_seen, 10);
    }

    #[test]
    fn break_stops_after_presenting_that_frame() {
        let mut surface = FakeSurface::default();
        let mut frames = 0;
        Mainloop::new(MainloopConfig::default()).run_with_clock(
            &mut surface,
            ticking(Duration::from_millis(1)),
            || {},
            |_| {
                frames += 1;
                if frames == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );
        assert_eq!(frames, 3);
        assert_eq!((surface.swaps, surface.polls), (3, 3));
    }
}
