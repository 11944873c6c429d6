//! Runner tuning
//!
//! Units are playfield pixels and fixed ticks. The playfield uses screen
//! coordinates: x grows rightward, y grows downward, the ground line sits at
//! `ground_y`.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DELTA_MS, RUNNER_STEP_MS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    // === Playfield ===
    pub field_width: f32,
    pub ground_y: f32,
    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub crouch_width: f32,
    pub crouch_height: f32,

    // === Physics (per tick) ===
    pub gravity: f32,
    pub jump_velocity: f32,
    /// Extra downward acceleration while crouching in the air
    pub fast_fall_accel: f32,
    /// Velocity floor (negative = downward)
    pub max_fall_velocity: f32,

    // === Timing ===
    pub step_ms: f32,
    pub max_frame_delta_ms: f32,

    // === Pace and scoring ===
    pub base_speed: f32,
    pub max_speed: f32,
    /// Score points per extra pixel/tick of speed
    pub speed_score_divisor: f32,
    pub score_rate_per_second: f32,

    // === Rotation ===
    pub rotation_ticks_per_jump: f32,
    pub rotation_ease_power: f32,

    // === Spawning ===
    pub first_spawn_ms: f32,
    pub spawn_base_ms: f32,
    pub spawn_jitter_ms: f32,
    /// Countdown shrinks by `score * factor` ms ...
    pub spawn_score_factor: f32,
    /// ... but never by more than this
    pub spawn_score_cap_ms: f32,
    pub ground_chance: f64,
    pub ground_min_width: f32,
    pub ground_width_jitter: f32,
    pub ground_min_height: f32,
    pub ground_height_jitter: f32,
    pub flying_width: f32,
    pub flying_height: f32,
    /// Gap between the ground line and a flying obstacle's bottom edge
    pub flying_clearances: Vec<f32>,
    pub spawn_offset: f32,
    /// Obstacles are dropped once their right edge reaches this x
    pub despawn_x: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            field_width: 620.0,
            ground_y: 180.0,
            player_x: 54.0,
            player_width: 34.0,
            player_height: 34.0,
            crouch_width: 34.0,
            crouch_height: 24.0,

            gravity: 0.58,
            jump_velocity: 10.6,
            fast_fall_accel: 0.95,
            max_fall_velocity: -16.0,

            step_ms: RUNNER_STEP_MS,
            max_frame_delta_ms: MAX_FRAME_DELTA_MS,

            base_speed: 5.0,
            max_speed: 8.1,
            speed_score_divisor: 220.0,
            score_rate_per_second: 14.0,

            rotation_ticks_per_jump: 40.0,
            rotation_ease_power: 1.65,

            first_spawn_ms: 800.0,
            spawn_base_ms: 780.0,
            spawn_jitter_ms: 620.0,
            spawn_score_factor: 2.0,
            spawn_score_cap_ms: 260.0,
            ground_chance: 0.65,
            ground_min_width: 20.0,
            ground_width_jitter: 16.0,
            ground_min_height: 26.0,
            ground_height_jitter: 26.0,
            flying_width: 34.0,
            flying_height: 22.0,
            flying_clearances: vec![18.0, 34.0, 50.0],
            spawn_offset: 10.0,
            despawn_x: -20.0,
        }
    }
}

impl RunnerConfig {
    /// Score gained per fixed tick
    pub fn score_per_tick(&self) -> f32 {
        self.score_rate_per_second / 60.0
    }

    /// Horizontal scroll speed (px/tick) at a given score
    pub fn speed_at(&self, score: f32) -> f32 {
        (self.base_speed + score / self.speed_score_divisor).min(self.max_speed)
    }

    /// Player box size for the given stance
    pub fn player_size(&self, crouching: bool) -> (f32, f32) {
        if crouching {
            (self.crouch_width, self.crouch_height)
        } else {
            (self.player_width, self.player_height)
        }
    }
}
