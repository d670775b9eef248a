//! Shared types for the scenic workspace.
//!
//! Everything here is plain data handed across crate boundaries: arena
//! handles, frame timing, and the contexts the scene passes through to
//! component hooks without interpreting them.

mod context;
mod types;

pub use context::{DrawCommand, DrawSink, FrameTime, RenderContext, UpdateContext};
pub use types::{ComponentId, EntityId};
