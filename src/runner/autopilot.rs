//! Demo autopilot
//!
//! Plays the runner for headless hosts: jump ground obstacles, duck flying
//! ones that would clip a standing player.

use super::collision::hit_box;
use super::config::RunnerConfig;
use super::engine::RunnerSnapshot;
use super::state::ObstacleKind;

/// Ticks of travel ahead the autopilot reacts to
const LOOKAHEAD_TICKS: f32 = 9.0;

/// Held inputs the autopilot wants this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutopilotInput {
    pub jump: bool,
    pub crouch: bool,
}

pub fn decide(snapshot: &RunnerSnapshot, config: &RunnerConfig) -> AutopilotInput {
    let player_front = snapshot.player.right();
    let reach = player_front + snapshot.speed * LOOKAHEAD_TICKS;
    let standing_top = config.ground_y - config.player_height;

    let threat = snapshot
        .obstacles
        .iter()
        .filter(|o| {
            let hb = hit_box(o);
            hb.right() > snapshot.player.left() && hb.left() < reach
        })
        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x));

    match threat {
        Some(o) if o.kind == ObstacleKind::Ground => AutopilotInput {
            jump: true,
            crouch: false,
        },
        Some(o) if hit_box(o).bottom() > standing_top => AutopilotInput {
            jump: false,
            crouch: true,
        },
        _ => AutopilotInput::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use crate::runner::engine::RunnerEngine;
    use crate::runner::state::Obstacle;
    use glam::Vec2;

    fn snapshot_with(obstacle: Obstacle) -> (RunnerSnapshot, RunnerConfig) {
        let config = RunnerConfig::default();
        let rng = ScriptedRandom::new(std::iter::empty());
        let mut engine = RunnerEngine::with_rng(config.clone(), rng);
        engine.start();
        let mut snap = engine.snapshot();
        snap.obstacles.push(obstacle);
        (snap, config)
    }

    #[test]
    fn test_jumps_close_ground_obstacle() {
        let (snap, config) = snapshot_with(Obstacle {
            id: 0,
            kind: ObstacleKind::Ground,
            pos: Vec2::new(110.0, 150.0),
            size: Vec2::new(20.0, 30.0),
        });
        assert_eq!(decide(&snap, &config), AutopilotInput { jump: true, crouch: false });
    }

    #[test]
    fn test_ignores_far_obstacle() {
        let (snap, config) = snapshot_with(Obstacle {
            id: 0,
            kind: ObstacleKind::Ground,
            pos: Vec2::new(500.0, 150.0),
            size: Vec2::new(20.0, 30.0),
        });
        assert_eq!(decide(&snap, &config), AutopilotInput::default());
    }

    #[test]
    fn test_ducks_low_flyer_but_not_high_one() {
        let low = Obstacle {
            id: 0,
            kind: ObstacleKind::Flying,
            pos: Vec2::new(100.0, 135.0),
            size: Vec2::new(34.0, 22.0),
        };
        let (snap, config) = snapshot_with(low.clone());
        assert!(decide(&snap, &config).crouch);

        let high = Obstacle {
            pos: Vec2::new(100.0, 90.0),
            ..low
        };
        let (snap, config) = snapshot_with(high);
        assert_eq!(decide(&snap, &config), AutopilotInput::default());
    }
}
