//! Developer tooling: scene inspector, hierarchy dump, text draw sink.
//!
//! # Invariants
//! - Inspection is read-only; nothing here mutates a scene.

mod inspector;
mod text_sink;

pub use inspector::{ComponentInfo, EntityInfo, SceneInspector, SceneSummary};
pub use text_sink::TextSink;

pub fn crate_info() -> &'static str {
    "scenic-tools v0.1.0"
}
