//! Runner state and core types
//!
//! Everything the fixed tick mutates lives in `RunnerState`; the engine owns
//! exactly one of these per run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::config::RunnerConfig;

/// Run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunStatus {
    /// No run started yet
    #[default]
    Idle,
    Running,
    /// Collision ended the run; score is frozen
    GameOver,
}

/// Axis-aligned rectangle, `pos` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Strict overlap: touching edges don't count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Rests on the ground line; jump over it
    Ground,
    /// Hovers above the ground line; duck under it
    Flying,
}

/// A scrolling obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u64,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    /// Visual rectangle
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }
}

/// Complete per-run state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerState {
    pub status: RunStatus,
    /// Height above the ground line (0 = grounded)
    pub lift: f32,
    /// Vertical velocity, positive = upward
    pub velocity: f32,
    /// Displayed rotation in degrees (unbounded accumulator)
    pub rotation: f32,
    /// Rotation captured at the last jump impulse
    pub rotation_start: f32,
    /// Cumulative target (+90 per impulse)
    pub rotation_target: f32,
    /// Airborne ticks since the last impulse
    pub rotation_ticks: u32,
    pub crouching: bool,
    pub jump_held: bool,
    /// Obstacles in creation order
    pub obstacles: Vec<Obstacle>,
    pub score: f32,
    /// Milliseconds until the next spawn
    pub spawn_timer_ms: f32,
    /// Fixed ticks simulated this run
    pub ticks: u64,
    next_obstacle_id: u64,
}

impl RunnerState {
    /// Fresh state for a new run
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            status: RunStatus::Idle,
            lift: 0.0,
            velocity: 0.0,
            rotation: 0.0,
            rotation_start: 0.0,
            rotation_target: 0.0,
            rotation_ticks: 0,
            crouching: false,
            jump_held: false,
            obstacles: Vec::new(),
            score: 0.0,
            spawn_timer_ms: config.first_spawn_ms,
            ticks: 0,
            next_obstacle_id: 0,
        }
    }

    /// Allocate an obstacle id
    pub fn next_obstacle_id(&mut self) -> u64 {
        let id = self.next_obstacle_id;
        self.next_obstacle_id += 1;
        id
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.lift == 0.0
    }

    /// Launch: set velocity and queue another quarter turn
    pub fn apply_jump_impulse(&mut self, config: &RunnerConfig) {
        self.velocity = config.jump_velocity;
        self.rotation_start = self.rotation;
        self.rotation_target += 90.0;
        self.rotation_ticks = 0;
    }

    /// Player collision box for the current stance and lift
    pub fn player_box(&self, config: &RunnerConfig) -> Rect {
        let (width, height) = config.player_size(self.crouching);
        Rect::new(
            config.player_x,
            config.ground_y - height - self.lift,
            width,
            height,
        )
    }

    /// Whole points earned so far
    pub fn whole_score(&self) -> u32 {
        self.score.max(0.0).floor() as u32
    }
}
