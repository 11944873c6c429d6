//! Portfolio Sims - two small real-time simulations
//!
//! Core modules:
//! - `runner`: Endless-runner physics, obstacle spawning, collision, scoring
//! - `market`: Stochastic price process with leveraged position accounting
//! - `clock`: Fixed-step and rate-limited tick scheduling shared by both engines
//! - `rng`: Injectable random source
//! - `leaderboard`: Fire-and-forget client for the remote score board
//! - `highscores`: Local best-score persistence
//! - `settings`: Tuning and endpoint configuration

pub mod clock;
pub mod highscores;
pub mod leaderboard;
pub mod market;
pub mod rng;
pub mod runner;
pub mod settings;

pub use highscores::BestScore;
pub use settings::Settings;

/// Engine-wide timing constants
pub mod consts {
    /// Runner fixed step (60 Hz)
    pub const RUNNER_STEP_MS: f32 = 1000.0 / 60.0;
    /// Largest wall-clock delta fed to the runner per frame (tab-resume guard)
    pub const MAX_FRAME_DELTA_MS: f32 = 100.0;
    /// Market logical tick period
    pub const MARKET_TICK_MS: u64 = 1000;
    /// How often the host polls the market engine
    pub const MARKET_POLL_MS: u64 = 120;
}
