use std::hint::black_box;
use std::time::Instant;

use scenic_common::{FrameTime, UpdateContext};
use scenic_scene::{Capabilities, Component, Entity, Progress, Scene, SceneAccess};

struct Tick(u64);

impl Component for Tick {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::RENDER
    }

    fn update(&mut self, _scene: &mut SceneAccess<'_>, _ctx: &mut UpdateContext<'_>) -> Progress {
        self.0 = self.0.wrapping_add(1);
        Progress::Complete
    }
}

/// `width` children per level, `depth` levels, one component per entity.
fn make_tree(width: usize, depth: usize) -> Entity {
    let mut entity = Entity::new(format!("d{depth}")).with_component(Tick(0));
    if depth > 0 {
        for _ in 0..width {
            entity = entity.with_child(make_tree(width, depth - 1));
        }
    }
    entity
}

fn make_scene(width: usize, depth: usize) -> Scene {
    let mut scene = Scene::new(std::iter::empty(), [make_tree(width, depth)]);
    scene.update(UpdateContext::new(FrameTime::default())).for_each(drop);
    scene
}

fn bench_full_update(width: usize, depth: usize, iterations: usize) {
    let mut scene = make_scene(width, depth);
    let components = scene.updatable().len();

    let start = Instant::now();
    for _ in 0..iterations {
        let steps = scene.update(UpdateContext::new(FrameTime::default())).count();
        black_box(steps);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  full update ({components} components, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_sliced_update(width: usize, depth: usize, budget: usize, iterations: usize) {
    let mut scene = make_scene(width, depth);
    let components = scene.updatable().len();

    let start = Instant::now();
    for _ in 0..iterations {
        let steps = scene
            .update(UpdateContext::new(FrameTime::default()))
            .take(budget)
            .count();
        black_box(steps);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  sliced update ({components} components, budget {budget}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_churn(width: usize, depth: usize, iterations: usize) {
    let mut scene = make_scene(2, 2);
    let root = scene.root();

    let start = Instant::now();
    for _ in 0..iterations {
        let id = scene.attach(root, make_tree(width, depth));
        scene.update(UpdateContext::new(FrameTime::default())).for_each(drop);
        scene.remove_child(root, &[id]);
        scene.update(UpdateContext::new(FrameTime::default())).for_each(drop);
        let _ = black_box(scene.despawn(id));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  mount/unmount churn (subtree {width}x{depth}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Scene Update Benchmarks ===\n");

    println!("Full update:");
    bench_full_update(10, 2, 1000);
    bench_full_update(10, 3, 100);
    bench_full_update(10, 4, 10);

    println!("\nSliced update (budgeted pulls):");
    bench_sliced_update(10, 3, 64, 1000);
    bench_sliced_update(10, 4, 256, 100);

    println!("\nStructural churn:");
    bench_churn(4, 2, 1000);
    bench_churn(8, 3, 100);

    println!("\n=== Done ===");
}
