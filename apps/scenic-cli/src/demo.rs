use glam::{Mat4, Vec3};
use scenic_common::{DrawCommand, RenderContext, UpdateContext};
use scenic_scene::{Capabilities, Component, Entity, Progress, Scene, SceneAccess};

/// Rotates in place and draws itself every frame.
pub struct Spinner {
    label: String,
    offset: Vec3,
    speed: f32,
    angle: f32,
    pub updates: u64,
    pub fixed_steps: u64,
}

impl Spinner {
    pub fn new(label: impl Into<String>, offset: Vec3, speed: f32) -> Self {
        Self {
            label: label.into(),
            offset,
            speed,
            angle: 0.0,
            updates: 0,
            fixed_steps: 0,
        }
    }
}

impl Component for Spinner {
    fn capabilities(&self) -> Capabilities {
        Capabilities::DID_MOUNT
            | Capabilities::UPDATE
            | Capabilities::FIXED_UPDATE
            | Capabilities::RENDER
    }

    fn did_mount(&mut self, scene: &mut SceneAccess<'_>) {
        tracing::trace!(entity = %scene.entity().short(), label = %self.label, "spinner mounted");
    }

    fn update(&mut self, _scene: &mut SceneAccess<'_>, ctx: &mut UpdateContext<'_>) -> Progress {
        self.angle += self.speed * ctx.time.delta_time as f32;
        self.updates += 1;
        Progress::Complete
    }

    fn fixed_update(
        &mut self,
        _scene: &mut SceneAccess<'_>,
        _ctx: &mut UpdateContext<'_>,
    ) -> Progress {
        self.fixed_steps += 1;
        Progress::Complete
    }

    fn render(&mut self, _scene: &mut SceneAccess<'_>, ctx: &mut RenderContext<'_>) {
        let model = Mat4::from_translation(self.offset) * Mat4::from_rotation_y(self.angle);
        ctx.graphics
            .push(DrawCommand::new(self.label.clone(), ctx.view_projection() * model));
    }
}

/// `width` children per level below a single node, `depth` levels deep.
pub fn demo_tree(name: &str, width: usize, depth: usize) -> Entity {
    let level = depth as f32;
    let mut entity = Entity::new(name).with_component(Spinner::new(
        name,
        Vec3::new(0.0, level, 0.0),
        1.0 + level * 0.5,
    ));
    if depth > 0 {
        for i in 0..width {
            entity = entity.with_child(demo_tree(&format!("{name}.{i}"), width, depth - 1));
        }
    }
    entity
}

pub fn demo_scene(width: usize, depth: usize) -> Scene {
    Scene::new(std::iter::empty(), [demo_tree("n", width, depth)])
}

/// Sum of update and fixed step counts over every spinner in the scene.
pub fn spinner_totals(scene: &Scene) -> (u64, u64) {
    scene
        .subtree(scene.root())
        .into_iter()
        .flat_map(|entity| scene.get_components::<Spinner>(entity))
        .filter_map(|id| scene.component::<Spinner>(id))
        .fold((0, 0), |(u, f), s| (u + s.updates, f + s.fixed_steps))
}
