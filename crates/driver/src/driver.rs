use std::time::{Duration, Instant};

use glam::Mat4;
use scenic_common::{DrawSink, FrameTime, RenderContext, UpdateContext};
use scenic_scene::Scene;

use crate::config::{ConfigError, DriverConfig};
use crate::timer::FrameTimer;

/// What one [`Driver::frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    /// Steps pulled from the update pass, mount hooks included.
    pub update_steps: usize,
    /// The update pass was cut off by the step budget before it reported
    /// completion.
    pub budget_exhausted: bool,
    pub mounted: usize,
    pub unmounted: usize,
    /// Fixed passes run this frame.
    pub fixed_passes: u32,
    /// Hook calls across all fixed passes.
    pub fixed_steps: usize,
    /// Accumulated seconds discarded by the per-frame fixed pass cap.
    pub dropped_fixed_time: f64,
    pub render_steps: usize,
    pub wall_time: Duration,
}

/// Drives a [`Scene`] one frame at a time.
pub struct Driver {
    config: DriverConfig,
    time: FrameTime,
    accumulator: f64,
    view: Mat4,
    projection: Mat4,
    timer: FrameTimer,
    last: FrameStats,
}

impl Driver {
    /// Fails if `config` does not pass [`DriverConfig::validate`].
    pub fn new(config: DriverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut time = FrameTime::with_fixed_delta(config.fixed_timestep);
        time.time_scale = config.time_scale;
        Ok(Self {
            timer: FrameTimer::new(config.frame_history),
            config,
            time,
            accumulator: 0.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            last: FrameStats::default(),
        })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn time(&self) -> FrameTime {
        self.time
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last
    }

    /// Ignored, with a warning, unless finite and non-negative.
    pub fn set_time_scale(&mut self, scale: f64) {
        if !(scale.is_finite() && scale >= 0.0) {
            tracing::warn!(scale, "invalid time scale ignored");
            return;
        }
        self.config.time_scale = scale;
        self.time.time_scale = scale;
    }

    pub fn set_update_step_budget(&mut self, budget: Option<usize>) {
        self.config.update_step_budget = budget;
    }

    /// Camera handed to every render step.
    pub fn set_camera(&mut self, view: Mat4, projection: Mat4) {
        self.view = view;
        self.projection = projection;
    }

    /// Run one frame of `real_dt` unscaled seconds: update (within the step
    /// budget), as many fixed passes as the accumulator allows, then render.
    pub fn frame(&mut self, scene: &mut Scene, real_dt: f64, sink: &mut dyn DrawSink) -> FrameStats {
        let start = Instant::now();
        self.time.advance(real_dt.max(0.0));
        let span = tracing::info_span!("frame", frame = self.time.frame_count);
        let _enter = span.enter();

        let mut stats = FrameStats {
            frame: self.time.frame_count,
            ..FrameStats::default()
        };

        {
            let budget = self.config.update_step_budget.unwrap_or(usize::MAX);
            let mut pass = scene.update(UpdateContext::with_debug(self.time, &mut *sink));
            stats.update_steps = pass.by_ref().take(budget).count();
            stats.budget_exhausted = !pass.is_finished();
            let pass_stats = pass.stats();
            stats.mounted = pass_stats.mounted;
            stats.unmounted = pass_stats.unmounted;
        }
        if stats.budget_exhausted {
            tracing::warn!(
                budget = stats.update_steps,
                "update step budget exhausted; rest of pass abandoned"
            );
        }

        let step = self.config.fixed_timestep;
        self.accumulator += self.time.delta_time;
        while self.accumulator >= step && stats.fixed_passes < self.config.max_fixed_steps_per_frame {
            self.time.advance_fixed();
            stats.fixed_steps += scene
                .fixed_update(UpdateContext::with_debug(self.time, &mut *sink))
                .count();
            self.accumulator -= step;
            stats.fixed_passes += 1;
        }
        if step > 0.0 && self.accumulator >= step {
            let kept = self.accumulator % step;
            stats.dropped_fixed_time = self.accumulator - kept;
            self.accumulator = kept;
            tracing::debug!(
                dropped = stats.dropped_fixed_time,
                cap = self.config.max_fixed_steps_per_frame,
                "fixed pass cap hit"
            );
        }

        let mut ctx = RenderContext::new(self.time, sink);
        ctx.view = self.view;
        ctx.projection = self.projection;
        stats.render_steps = scene.render(ctx).count();

        stats.wall_time = start.elapsed();
        self.timer.record(stats.wall_time);
        self.last = stats;
        tracing::debug!(
            update_steps = stats.update_steps,
            fixed_passes = stats.fixed_passes,
            render_steps = stats.render_steps,
            wall_us = stats.wall_time.as_micros() as u64,
            "frame complete"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenic_common::DrawCommand;
    use scenic_scene::{Capabilities, Component, Entity, Progress, SceneAccess};

    #[derive(Default)]
    struct Ticker {
        updates: u32,
        fixed: u32,
        fixed_time: f64,
    }

    impl Component for Ticker {
        fn capabilities(&self) -> Capabilities {
            Capabilities::UPDATE | Capabilities::FIXED_UPDATE | Capabilities::RENDER
        }

        fn update(&mut self, _scene: &mut SceneAccess<'_>, _ctx: &mut UpdateContext<'_>) -> Progress {
            self.updates += 1;
            Progress::Complete
        }

        fn fixed_update(
            &mut self,
            _scene: &mut SceneAccess<'_>,
            ctx: &mut UpdateContext<'_>,
        ) -> Progress {
            self.fixed += 1;
            self.fixed_time = ctx.time.fixed_time;
            Progress::Complete
        }

        fn render(&mut self, _scene: &mut SceneAccess<'_>, ctx: &mut RenderContext<'_>) {
            ctx.graphics.push(DrawCommand::new("tick", ctx.view_projection()));
        }
    }

    fn scene_with(count: usize) -> Scene {
        Scene::new(
            std::iter::empty(),
            (0..count).map(|i| Entity::new(format!("t{i}")).with_component(Ticker::default())),
        )
    }

    fn ticker(scene: &Scene, index: usize) -> &Ticker {
        let entity = scene.find(&format!("t{index}")).unwrap();
        let id = scene.get_component::<Ticker>(entity).unwrap();
        scene.component::<Ticker>(id).unwrap()
    }

    fn config(fixed_timestep: f64) -> DriverConfig {
        DriverConfig {
            fixed_timestep,
            ..DriverConfig::default()
        }
    }

    #[test]
    fn frame_runs_update_fixed_then_render() {
        let mut scene = scene_with(2);
        let mut driver = Driver::new(config(0.25)).unwrap();
        let mut sink: Vec<DrawCommand> = Vec::new();

        let stats = driver.frame(&mut scene, 0.5, &mut sink);
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.update_steps, 2);
        assert_eq!(stats.mounted, 2);
        assert!(!stats.budget_exhausted);
        assert_eq!(stats.fixed_passes, 2);
        assert_eq!(stats.fixed_steps, 4);
        assert_eq!(stats.render_steps, 2);
        assert_eq!(sink.len(), 2);

        assert_eq!(driver.time().time, 0.5);
        assert_eq!(driver.time().fixed_time, 0.5);
        assert_eq!(ticker(&scene, 0).fixed_time, 0.5);
        assert_eq!(ticker(&scene, 1).updates, 1);
        assert_eq!(driver.last_stats(), stats);
        assert_eq!(driver.timer().count(), 1);
    }

    #[test]
    fn accumulator_carries_partial_steps() {
        let mut scene = scene_with(1);
        let mut driver = Driver::new(config(0.25)).unwrap();
        let mut sink: Vec<DrawCommand> = Vec::new();

        assert_eq!(driver.frame(&mut scene, 0.125, &mut sink).fixed_passes, 0);
        assert_eq!(driver.frame(&mut scene, 0.125, &mut sink).fixed_passes, 1);
        assert_eq!(ticker(&scene, 0).fixed, 1);
    }

    #[test]
    fn fixed_passes_are_capped_and_excess_dropped() {
        let mut scene = scene_with(1);
        let mut driver = Driver::new(DriverConfig {
            max_fixed_steps_per_frame: 2,
            ..config(0.25)
        })
        .unwrap();
        let mut sink: Vec<DrawCommand> = Vec::new();

        let stats = driver.frame(&mut scene, 2.0, &mut sink);
        assert_eq!(stats.fixed_passes, 2);
        assert_eq!(stats.dropped_fixed_time, 1.5);
        assert_eq!(driver.frame(&mut scene, 0.125, &mut sink).fixed_passes, 0);
    }

    #[test]
    fn step_budget_abandons_the_rest() {
        let mut scene = scene_with(5);
        let mut driver = Driver::new(DriverConfig {
            update_step_budget: Some(2),
            ..DriverConfig::default()
        })
        .unwrap();
        let mut sink: Vec<DrawCommand> = Vec::new();

        let stats = driver.frame(&mut scene, 0.0, &mut sink);
        assert_eq!(stats.update_steps, 2);
        assert!(stats.budget_exhausted);
        driver.frame(&mut scene, 0.0, &mut sink);
        let updates: Vec<u32> = (0..5).map(|i| ticker(&scene, i).updates).collect();
        assert_eq!(updates, [2, 2, 0, 0, 0]);

        driver.set_update_step_budget(None);
        let stats = driver.frame(&mut scene, 0.0, &mut sink);
        assert!(!stats.budget_exhausted);
        assert_eq!(stats.update_steps, 5);
    }

    #[test]
    fn time_scale_applies_to_fixed_accumulation() {
        let mut scene = scene_with(1);
        let mut driver = Driver::new(DriverConfig {
            time_scale: 0.5,
            ..config(0.25)
        })
        .unwrap();
        let mut sink: Vec<DrawCommand> = Vec::new();

        let stats = driver.frame(&mut scene, 1.0, &mut sink);
        assert_eq!(driver.time().delta_time, 0.5);
        assert_eq!(stats.fixed_passes, 2);

        driver.set_time_scale(0.0);
        let stats = driver.frame(&mut scene, 1.0, &mut sink);
        assert_eq!(driver.time().delta_time, 0.0);
        assert_eq!(stats.fixed_passes, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let zero_step = Driver::new(config(0.0));
        assert!(matches!(zero_step, Err(ConfigError::Invalid(_))));
        let negative_scale = Driver::new(DriverConfig {
            time_scale: -1.0,
            ..DriverConfig::default()
        });
        assert!(matches!(negative_scale, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn fixed_passes_keep_running_after_a_capped_frame() {
        let mut scene = scene_with(1);
        let mut driver = Driver::new(DriverConfig {
            max_fixed_steps_per_frame: 1,
            ..config(0.25)
        })
        .unwrap();
        let mut sink: Vec<DrawCommand> = Vec::new();

        let stats = driver.frame(&mut scene, 1.0, &mut sink);
        assert_eq!(stats.fixed_passes, 1);
        assert!(stats.dropped_fixed_time.is_finite());
        let stats = driver.frame(&mut scene, 0.25, &mut sink);
        assert_eq!(stats.fixed_passes, 1);
        assert_eq!(ticker(&scene, 0).fixed, 2);
    }

    #[test]
    fn invalid_time_scale_is_ignored() {
        let mut driver = Driver::new(DriverConfig::default()).unwrap();
        driver.set_time_scale(f64::NAN);
        driver.set_time_scale(-2.0);
        assert_eq!(driver.config().time_scale, 1.0);
        assert_eq!(driver.time().time_scale, 1.0);
    }

    #[test]
    fn camera_reaches_render_steps() {
        let mut scene = scene_with(1);
        let mut driver = Driver::new(DriverConfig::default()).unwrap();
        let view = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        driver.set_camera(view, Mat4::IDENTITY);
        let mut sink: Vec<DrawCommand> = Vec::new();
        driver.frame(&mut scene, 0.0, &mut sink);
        assert_eq!(sink[0].transform, view);
    }
}
