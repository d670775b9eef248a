use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Timing snapshot handed to every update, fixed update and render step.
///
/// The scene never reads these values itself; they are forwarded unchanged
/// to component hooks. The driver owns advancing them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTime {
    /// Scaled seconds since the driver started.
    pub time: f64,
    /// Scaled seconds covered by the current frame.
    pub delta_time: f64,
    /// Seconds of simulation covered by fixed steps so far.
    pub fixed_time: f64,
    /// Length of one fixed step in seconds.
    pub fixed_delta_time: f64,
    pub time_scale: f64,
    pub frame_count: u64,
}

impl Default for FrameTime {
    fn default() -> Self {
        Self {
            time: 0.0,
            delta_time: 0.0,
            fixed_time: 0.0,
            fixed_delta_time: 1.0 / 60.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl FrameTime {
    /// Start a clock with the given fixed step length.
    pub fn with_fixed_delta(fixed_delta_time: f64) -> Self {
        Self {
            fixed_delta_time,
            ..Default::default()
        }
    }

    /// Advance by one variable-rate frame of `real_dt` unscaled seconds.
    pub fn advance(&mut self, real_dt: f64) {
        self.delta_time = real_dt * self.time_scale;
        self.time += self.delta_time;
        self.frame_count += 1;
    }

    /// Advance the fixed clock by exactly one fixed step.
    pub fn advance_fixed(&mut self) {
        self.fixed_time += self.fixed_delta_time;
    }
}

/// A single draw request pushed to a [`DrawSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub label: String,
    pub transform: Mat4,
}

impl DrawCommand {
    pub fn new(label: impl Into<String>, transform: Mat4) -> Self {
        Self {
            label: label.into(),
            transform,
        }
    }
}

/// Graphics collaborator. Renderers and debug overlays implement this; the
/// scene only hands it to component hooks.
pub trait DrawSink {
    fn push(&mut self, command: DrawCommand);
}

impl DrawSink for Vec<DrawCommand> {
    fn push(&mut self, command: DrawCommand) {
        Vec::push(self, command);
    }
}

/// Context for update and fixed update steps.
pub struct UpdateContext<'a> {
    pub time: FrameTime,
    /// Optional debug drawing handle.
    pub debug: Option<&'a mut dyn DrawSink>,
}

impl<'a> UpdateContext<'a> {
    pub fn new(time: FrameTime) -> Self {
        Self { time, debug: None }
    }

    pub fn with_debug(time: FrameTime, debug: &'a mut dyn DrawSink) -> Self {
        Self {
            time,
            debug: Some(debug),
        }
    }

    /// Push to the debug handle if one is attached; dropped otherwise.
    pub fn debug_draw(&mut self, command: DrawCommand) {
        if let Some(debug) = self.debug.as_deref_mut() {
            debug.push(command);
        }
    }
}

/// Context for render steps: timing, camera transforms and the graphics handle.
pub struct RenderContext<'a> {
    pub time: FrameTime,
    pub view: Mat4,
    pub projection: Mat4,
    pub graphics: &'a mut dyn DrawSink,
}

impl<'a> RenderContext<'a> {
    pub fn new(time: FrameTime, graphics: &'a mut dyn DrawSink) -> Self {
        Self {
            time,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            graphics,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}
