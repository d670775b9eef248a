//! Cooperative, pull-based passes over a scene.
//!
//! Each pass is an [`Iterator`] of [`Step`]s. One `next()` runs host code up
//! to exactly one hook invocation and returns; the driver decides how many
//! steps to pull per frame. Dropping a pass abandons the rest of its work.
//! Nothing already applied is rolled back.
//!
//! # Ordering
//! Within one update pass: removals, then additions, then a re-sort, then
//! updates in ascending execution order (stable on ties).

use scenic_common::{ComponentId, EntityId, RenderContext, UpdateContext};

use crate::component::{Capabilities, Progress};
use crate::scene::Scene;

/// One unit of work executed by a single pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `will_unmount` ran for this component.
    Unmounted(ComponentId),
    /// `did_mount` ran for this component.
    Mounted(ComponentId),
    Updated {
        component: ComponentId,
        progress: Progress,
    },
    FixedUpdated {
        component: ComponentId,
        progress: Progress,
    },
    Rendered(ComponentId),
}

impl Step {
    pub fn component(&self) -> ComponentId {
        match *self {
            Step::Unmounted(c) | Step::Mounted(c) | Step::Rendered(c) => c,
            Step::Updated { component, .. } | Step::FixedUpdated { component, .. } => component,
        }
    }
}

/// Counters for a pass, readable while or after it runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub steps: usize,
    pub mounted: usize,
    pub unmounted: usize,
}

impl Scene {
    /// Drain pending removals and additions, re-sort, then update every
    /// active component, one step per pull.
    pub fn update<'c>(&mut self, ctx: UpdateContext<'c>) -> UpdatePass<'_, 'c> {
        UpdatePass {
            span: tracing::debug_span!("scene_update", frame = ctx.time.frame_count),
            scene: self,
            ctx,
            stage: Stage::Remove(Drain::default()),
            cursor: Cursor::default(),
            changed: false,
            stats: PassStats::default(),
        }
    }

    /// Fixed-rate update over the current updatable list. No structural
    /// changes are applied here.
    pub fn fixed_update<'c>(&mut self, ctx: UpdateContext<'c>) -> FixedUpdatePass<'_, 'c> {
        FixedUpdatePass {
            span: tracing::debug_span!("scene_fixed_update", fixed_time = ctx.time.fixed_time),
            scene: self,
            ctx,
            cursor: Cursor::default(),
            stats: PassStats::default(),
        }
    }

    /// Render every active renderable component in render order.
    pub fn render<'c>(&mut self, ctx: RenderContext<'c>) -> RenderPass<'_, 'c> {
        RenderPass {
            span: tracing::debug_span!("scene_render", frame = ctx.time.frame_count),
            scene: self,
            ctx,
            cursor: Cursor::default(),
            stats: PassStats::default(),
        }
    }
}

/// Progress through one pending queue.
///
/// The batch is a snapshot of the queue taken at stage entry. Entries are
/// removed from the scene's queue, by identity, only once the whole batch is
/// processed, so an abandoned pass leaves them for the next call and entries
/// queued by hooks meanwhile are never dropped.
#[derive(Debug, Default)]
struct Drain {
    batch: Option<Vec<EntityId>>,
    index: usize,
    current: Option<EntityId>,
    members: Vec<ComponentId>,
    member: usize,
}

impl Drain {
    /// Next component to process, advancing through queued subtrees.
    /// `on_subtree_done` runs once each queued entity's components are done.
    fn next_member(
        &mut self,
        scene: &mut Scene,
        queue: fn(&Scene) -> &[EntityId],
        mut on_subtree_done: impl FnMut(&mut Scene, EntityId),
    ) -> Option<ComponentId> {
        let batch = self.batch.get_or_insert_with(|| queue(scene).to_vec());
        loop {
            if let Some(id) = self.members.get(self.member).copied() {
                self.member += 1;
                return Some(id);
            }
            if let Some(entity) = self.current.take() {
                on_subtree_done(scene, entity);
            }
            let entity = *batch.get(self.index)?;
            self.index += 1;
            // Despawned by a hook since the snapshot: yields no members.
            self.members = scene.subtree_components(entity);
            self.member = 0;
            self.current = Some(entity);
        }
    }

    /// Drop the processed batch from `queue`, one occurrence per entry.
    fn settle(&self, queue: &mut Vec<EntityId>) {
        for entity in self.batch.iter().flatten() {
            if let Some(pos) = queue.iter().position(|e| e == entity) {
                queue.remove(pos);
            }
        }
    }
}

#[derive(Debug)]
enum Stage {
    Remove(Drain),
    Add(Drain),
    Sort,
    Run,
    Done,
}

/// Position in a cached list, plus whether the component at it asked to
/// be resumed.
#[derive(Debug, Default)]
struct Cursor {
    index: usize,
    resuming: bool,
}

impl Cursor {
    /// Next component in `list` to call, skipping ones that lack
    /// `capability` or are inactive. A resuming component is returned again
    /// without re-checking.
    fn next_target(
        &mut self,
        scene: &Scene,
        list: &[ComponentId],
        capability: Capabilities,
    ) -> Option<ComponentId> {
        while let Some(&id) = list.get(self.index) {
            if self.resuming {
                return Some(id);
            }
            if scene.capabilities(id).contains(capability) && scene.is_active(id) {
                return Some(id);
            }
            self.index += 1;
        }
        None
    }

    fn record(&mut self, progress: Progress) {
        match progress {
            Progress::Pending => self.resuming = true,
            Progress::Complete => {
                self.resuming = false;
                self.index += 1;
            }
        }
    }
}

/// Lazy update pass returned by [`Scene::update`].
pub struct UpdatePass<'s, 'c> {
    scene: &'s mut Scene,
    ctx: UpdateContext<'c>,
    stage: Stage,
    cursor: Cursor,
    changed: bool,
    stats: PassStats,
    span: tracing::Span,
}

impl UpdatePass<'_, '_> {
    pub fn stats(&self) -> PassStats {
        self.stats
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.stage, Stage::Done)
    }

    fn remove_step(&mut self) -> Option<Step> {
        let Stage::Remove(drain) = &mut self.stage else {
            return None;
        };
        let next = drain.next_member(self.scene, |s| s.entities_to_remove.as_slice(), |scene, entity| {
            scene.release_parent(entity);
        });
        let Some(id) = next else {
            drain.settle(&mut self.scene.entities_to_remove);
            self.stage = Stage::Add(Drain::default());
            return None;
        };
        let (capabilities, listed) = self.scene.unmount(id)?;
        self.changed = true;
        self.stats.unmounted += 1;
        tracing::trace!(component = %id.short(), listed, "unmounted");
        // Only components purged from a cached list are told about it.
        if !(listed && capabilities.contains(Capabilities::WILL_UNMOUNT)) {
            return None;
        }
        self.scene.with_component(id, |c, scene| c.will_unmount(scene));
        Some(Step::Unmounted(id))
    }

    fn add_step(&mut self) -> Option<Step> {
        let Stage::Add(drain) = &mut self.stage else {
            return None;
        };
        let next = drain.next_member(self.scene, |s| s.entities_to_add.as_slice(), |_, _| {});
        let Some(id) = next else {
            drain.settle(&mut self.scene.entities_to_add);
            self.stage = Stage::Sort;
            return None;
        };
        let capabilities = self.scene.mark_mounted(id)?;
        self.changed = true;
        self.stats.mounted += 1;
        tracing::trace!(component = %id.short(), "mounted");
        let step = if capabilities.contains(Capabilities::DID_MOUNT) {
            self.scene.with_component(id, |c, scene| c.did_mount(scene));
            Some(Step::Mounted(id))
        } else {
            None
        };
        self.scene.enlist(id, capabilities);
        step
    }

    fn run_step(&mut self) -> Option<Step> {
        let Self {
            scene, ctx, cursor, ..
        } = self;
        let list = scene.updatable.as_slice();
        let id = cursor.next_target(scene, list, Capabilities::UPDATE)?;
        let progress = scene
            .with_component(id, |c, scene| c.update(scene, ctx))
            .unwrap_or(Progress::Complete);
        cursor.record(progress);
        Some(Step::Updated {
            component: id,
            progress,
        })
    }
}

impl Iterator for UpdatePass<'_, '_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let span = self.span.clone();
        let _enter = span.enter();
        loop {
            let produced = match self.stage {
                Stage::Remove(_) => self.remove_step(),
                Stage::Add(_) => self.add_step(),
                Stage::Sort => {
                    self.scene.resort(self.changed);
                    self.stage = Stage::Run;
                    None
                }
                Stage::Run => match self.run_step() {
                    Some(step) => Some(step),
                    None => {
                        self.stage = Stage::Done;
                        tracing::debug!(
                            steps = self.stats.steps,
                            mounted = self.stats.mounted,
                            unmounted = self.stats.unmounted,
                            "update pass complete"
                        );
                        None
                    }
                },
                Stage::Done => return None,
            };
            if let Some(step) = produced {
                self.stats.steps += 1;
                return Some(step);
            }
        }
    }
}

/// Lazy fixed update pass returned by [`Scene::fixed_update`].
pub struct FixedUpdatePass<'s, 'c> {
    scene: &'s mut Scene,
    ctx: UpdateContext<'c>,
    cursor: Cursor,
    stats: PassStats,
    span: tracing::Span,
}

impl FixedUpdatePass<'_, '_> {
    pub fn stats(&self) -> PassStats {
        self.stats
    }
}

impl Iterator for FixedUpdatePass<'_, '_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let span = self.span.clone();
        let _enter = span.enter();
        let Self {
            scene, ctx, cursor, ..
        } = self;
        let list = scene.updatable.as_slice();
        let id = cursor.next_target(scene, list, Capabilities::FIXED_UPDATE)?;
        let progress = scene
            .with_component(id, |c, scene| c.fixed_update(scene, ctx))
            .unwrap_or(Progress::Complete);
        cursor.record(progress);
        self.stats.steps += 1;
        Some(Step::FixedUpdated {
            component: id,
            progress,
        })
    }
}

/// Lazy render pass returned by [`Scene::render`].
pub struct RenderPass<'s, 'c> {
    scene: &'s mut Scene,
    ctx: RenderContext<'c>,
    cursor: Cursor,
    stats: PassStats,
    span: tracing::Span,
}

impl RenderPass<'_, '_> {
    pub fn stats(&self) -> PassStats {
        self.stats
    }
}

impl Iterator for RenderPass<'_, '_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let span = self.span.clone();
        let _enter = span.enter();
        let Self {
            scene, ctx, cursor, ..
        } = self;
        let list = scene.renderable.as_slice();
        let id = cursor.next_target(scene, list, Capabilities::RENDER)?;
        scene.with_component(id, |c, scene| c.render(scene, ctx));
        cursor.record(Progress::Complete);
        self.stats.steps += 1;
        Some(Step::Rendered(id))
    }
}
