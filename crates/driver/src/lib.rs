//! Engine driver: owns the clock and decides how much of each scene pass runs
//! per frame.
//!
//! # Invariants
//! - One `update` pass per frame, then zero or more fixed passes, then one
//!   render pass.
//! - Fixed passes per frame never exceed `max_fixed_steps_per_frame`; excess
//!   accumulated time is dropped rather than carried over.
//! - An update cut short by the step budget is abandoned, never resumed.

mod config;
mod driver;
mod timer;

pub use config::{ConfigError, DriverConfig};
pub use driver::{Driver, FrameStats};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "scenic-driver v0.1.0"
}
