//! Scene graph core: entities, components, and the cooperative scheduler.
//!
//! A [`Scene`] owns an entity tree in an arena. Components attach to exactly
//! one entity and declare which hooks they implement. The scene's
//! [`update`](Scene::update), [`fixed_update`](Scene::fixed_update) and
//! [`render`](Scene::render) return lazy passes; every pull runs one hook.
//!
//! # Invariants
//! - Structural edits are queued and applied only at the start of `update`:
//!   removals strictly before additions.
//! - `did_mount` and `will_unmount` fire at most once per mount transition.
//! - Update order is ascending `execution_order`, insertion order on ties.
//! - Single-threaded; no hook runs unless the driver pulls a step.

mod component;
mod entity;
mod error;
mod ordered;
mod pass;
mod scene;

#[cfg(test)]
mod testing;

pub use component::{AsAny, Capabilities, Component, Progress};
pub use entity::Entity;
pub use error::SceneError;
pub use ordered::OrderedList;
pub use pass::{FixedUpdatePass, PassStats, RenderPass, Step, UpdatePass};
pub use scene::{Scene, SceneAccess};

pub fn crate_info() -> &'static str {
    "scenic-scene v0.1.0"
}
