//! Runner engine
//!
//! Owns the per-run state, the fixed-step budget and the random source.
//! Hosts feed it input edges and wall-clock deltas and read back snapshots.

use serde::Serialize;

use super::config::RunnerConfig;
use super::state::{Obstacle, Rect, RunStatus, RunnerState};
use super::tick::{TickOutcome, tick};
use crate::clock::FixedStep;
use crate::rng::{RandomSource, SimRng};

/// Reported once when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Final score, floored
    pub score: u32,
    /// Obstacle that ended the run
    pub obstacle_id: u64,
    /// Fixed ticks the run lasted
    pub ticks: u64,
}

/// Immutable view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerSnapshot {
    pub status: RunStatus,
    pub lift: f32,
    pub velocity: f32,
    pub rotation: f32,
    pub crouching: bool,
    pub score: u32,
    pub speed: f32,
    pub player: Rect,
    pub obstacles: Vec<Obstacle>,
    pub submitted: bool,
}

pub struct RunnerEngine<R: RandomSource = SimRng> {
    config: RunnerConfig,
    state: RunnerState,
    clock: FixedStep,
    rng: R,
    submitted: bool,
}

impl RunnerEngine<SimRng> {
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_rng(config, SimRng::from_entropy())
    }
}

impl<R: RandomSource> RunnerEngine<R> {
    pub fn with_rng(config: RunnerConfig, rng: R) -> Self {
        let clock = FixedStep::new(config.step_ms, config.max_frame_delta_ms);
        let state = RunnerState::new(&config);
        Self {
            config,
            state,
            clock,
            rng,
            submitted: false,
        }
    }

    /// Begin a fresh run, discarding all per-run state
    pub fn start(&mut self) {
        self.state = RunnerState::new(&self.config);
        self.state.status = RunStatus::Running;
        self.clock.reset();
        self.submitted = false;
        log::info!("Runner: run started");
    }

    /// Jump input went down. Starts a run if none is active.
    pub fn press_jump(&mut self) {
        if self.state.status != RunStatus::Running {
            self.start();
        }
        self.state.jump_held = true;
        if self.state.is_grounded() {
            self.state.apply_jump_impulse(&self.config);
        }
    }

    pub fn release_jump(&mut self) {
        self.state.jump_held = false;
    }

    /// Crouch input went down. Starts a run if none is active.
    pub fn press_crouch(&mut self) {
        if self.state.status != RunStatus::Running {
            self.start();
        } else {
            self.state.crouching = true;
        }
    }

    pub fn release_crouch(&mut self) {
        if self.state.status == RunStatus::Running {
            self.state.crouching = false;
        }
    }

    /// Consume a wall-clock delta; returns the outcome on the tick the run ends
    pub fn advance(&mut self, delta_ms: f32) -> Option<RunOutcome> {
        if self.state.status != RunStatus::Running {
            return None;
        }

        self.clock.push(delta_ms);
        while self.clock.try_consume() {
            if let TickOutcome::Collided { obstacle_id } =
                tick(&mut self.state, &self.config, &mut self.rng)
            {
                return Some(self.finish(obstacle_id));
            }
        }
        None
    }

    fn finish(&mut self, obstacle_id: u64) -> RunOutcome {
        self.state.crouching = false;
        self.state.jump_held = false;
        self.clock.reset();

        let outcome = RunOutcome {
            score: self.state.whole_score(),
            obstacle_id,
            ticks: self.state.ticks,
        };
        log::info!(
            "Runner: game over at score {} after {} ticks (obstacle #{})",
            outcome.score,
            outcome.ticks,
            obstacle_id
        );
        outcome
    }

    pub fn snapshot(&self) -> RunnerSnapshot {
        RunnerSnapshot {
            status: self.state.status,
            lift: self.state.lift,
            velocity: self.state.velocity,
            rotation: self.state.rotation,
            crouching: self.state.crouching,
            score: self.state.whole_score(),
            speed: self.config.speed_at(self.state.score),
            player: self.state.player_box(&self.config),
            obstacles: self.state.obstacles.clone(),
            submitted: self.submitted,
        }
    }

    /// Score eligible for leaderboard submission: finished, positive, not yet sent
    pub fn submission_score(&self) -> Option<u32> {
        let score = self.state.whole_score();
        (self.state.status == RunStatus::GameOver && score > 0 && !self.submitted).then_some(score)
    }

    /// Record that this run's score was accepted by the leaderboard
    pub fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    pub fn status(&self) -> RunStatus {
        self.state.status
    }

    pub fn state(&self) -> &RunnerState {
        &self.state
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }
}
