//! Procedural obstacle spawner
//!
//! Draw order per spawn: kind roll, then width and height (ground) or the
//! clearance pick (flying), then the next countdown.

use glam::Vec2;

use super::config::RunnerConfig;
use super::state::{Obstacle, ObstacleKind, RunnerState};
use crate::rng::RandomSource;

/// Build a new obstacle just past the right edge of the playfield
pub fn spawn_obstacle(
    state: &mut RunnerState,
    config: &RunnerConfig,
    rng: &mut impl RandomSource,
) -> Obstacle {
    let kind = if rng.chance(config.ground_chance) {
        ObstacleKind::Ground
    } else {
        ObstacleKind::Flying
    };

    let (size, y) = match kind {
        ObstacleKind::Ground => {
            let width = rng.range(
                config.ground_min_width as f64,
                config.ground_width_jitter as f64,
            ) as f32;
            let height = rng.range(
                config.ground_min_height as f64,
                config.ground_height_jitter as f64,
            ) as f32;
            (Vec2::new(width, height), config.ground_y - height)
        }
        ObstacleKind::Flying => {
            let clearance = rng.pick(&config.flying_clearances).copied().unwrap_or(0.0);
            let size = Vec2::new(config.flying_width, config.flying_height);
            (size, config.ground_y - size.y - clearance)
        }
    };

    let obstacle = Obstacle {
        id: state.next_obstacle_id(),
        kind,
        pos: Vec2::new(config.field_width + config.spawn_offset, y),
        size,
    };
    log::debug!(
        "Spawned {:?} obstacle #{} ({:.0}x{:.0} at y={:.0})",
        obstacle.kind,
        obstacle.id,
        size.x,
        size.y,
        y
    );
    obstacle
}

/// Countdown until the next spawn; shrinks with score
pub fn next_spawn_delay_ms(score: f32, config: &RunnerConfig, rng: &mut impl RandomSource) -> f32 {
    let jitter = rng.range(0.0, config.spawn_jitter_ms as f64) as f32;
    let score_cut = (score.max(0.0) * config.spawn_score_factor).min(config.spawn_score_cap_ms);
    config.spawn_base_ms + jitter - score_cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;

    #[test]
    fn test_ground_obstacle_rests_on_ground() {
        let config = RunnerConfig::default();
        let mut state = RunnerState::new(&config);
        // kind roll < 0.65 => ground, then width and height rolls
        let mut rng = ScriptedRandom::new([0.1, 0.5, 0.75]);
        let o = spawn_obstacle(&mut state, &config, &mut rng);
        assert_eq!(o.kind, ObstacleKind::Ground);
        assert!((o.size.x - 28.0).abs() < 1e-4);
        assert!((o.size.y - 45.5).abs() < 1e-4);
        assert!((o.pos.y + o.size.y - config.ground_y).abs() < 1e-4);
        assert_eq!(o.pos.x, 630.0);
    }

    #[test]
    fn test_flying_obstacle_uses_clearance_set() {
        let config = RunnerConfig::default();
        let mut state = RunnerState::new(&config);
        let mut rng = ScriptedRandom::new([0.9, 0.5]);
        let o = spawn_obstacle(&mut state, &config, &mut rng);
        assert_eq!(o.kind, ObstacleKind::Flying);
        assert_eq!(o.size, Vec2::new(34.0, 22.0));
        // Middle clearance (34)
        assert_eq!(o.pos.y, 180.0 - 22.0 - 34.0);
    }

    #[test]
    fn test_spawn_delay_shrinks_with_score() {
        let config = RunnerConfig::default();
        let mut rng = ScriptedRandom::new([0.0, 0.0, 0.0]);
        assert_eq!(next_spawn_delay_ms(0.0, &config, &mut rng), 780.0);
        assert_eq!(next_spawn_delay_ms(50.0, &config, &mut rng), 680.0);
        // Cap on the score reduction
        assert_eq!(next_spawn_delay_ms(1_000.0, &config, &mut rng), 520.0);
    }

    #[test]
    fn test_spawned_ids_increase() {
        let config = RunnerConfig::default();
        let mut state = RunnerState::new(&config);
        let mut rng = ScriptedRandom::new(std::iter::empty());
        let a = spawn_obstacle(&mut state, &config, &mut rng);
        let b = spawn_obstacle(&mut state, &config, &mut rng);
        assert!(b.id > a.id);
    }
}
