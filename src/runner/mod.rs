//! Endless-runner simulation
//!
//! Fixed 60 Hz physics, procedural obstacles and inset hit boxes:
//! - Fixed timestep only, driven by `RunnerEngine::advance`
//! - Injected random source (spawner only)
//! - Obstacles kept in creation order
//! - No rendering dependencies; positions are playfield pixels, rotation is degrees

pub mod autopilot;
pub mod collision;
pub mod config;
pub mod engine;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{first_hit, hit_box, player_hits};
pub use config::RunnerConfig;
pub use engine::{RunOutcome, RunnerEngine, RunnerSnapshot};
pub use state::{Obstacle, ObstacleKind, Rect, RunStatus, RunnerState};
pub use tick::{TickOutcome, ease_out, tick};
