//! Fixed timestep runner tick
//!
//! One call advances the run by exactly one 1/60 s step. Order matters:
//! physics, rotation, pacing, spawning, scrolling, collision, then scoring.

use super::collision::first_hit;
use super::config::RunnerConfig;
use super::spawn::{next_spawn_delay_ms, spawn_obstacle};
use super::state::{RunStatus, RunnerState};
use crate::rng::RandomSource;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Run not active, nothing changed
    Skipped,
    Advanced,
    /// Player touched an obstacle's hit box; the run is over
    Collided { obstacle_id: u64 },
}

/// Power-curve ease-out, `t` clamped to [0, 1]
#[inline]
pub fn ease_out(t: f32, power: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powf(power)
}

/// Advance the run by one fixed step
pub fn tick(
    state: &mut RunnerState,
    config: &RunnerConfig,
    rng: &mut impl RandomSource,
) -> TickOutcome {
    if state.status != RunStatus::Running {
        return TickOutcome::Skipped;
    }

    state.ticks += 1;

    // --- Vertical physics ---
    state.velocity -= config.gravity;
    if state.crouching && state.lift > 0.0 {
        state.velocity -= config.fast_fall_accel;
    }
    state.velocity = state.velocity.max(config.max_fall_velocity);
    integrate_lift(state);

    // Held jump re-launches on the tick we touch down
    if state.is_grounded() && state.jump_held {
        state.apply_jump_impulse(config);
        integrate_lift(state);
    }

    update_rotation(state, config);

    // --- Pacing and spawning ---
    let speed = config.speed_at(state.score);

    state.spawn_timer_ms -= config.step_ms;
    if state.spawn_timer_ms <= 0.0 {
        let obstacle = spawn_obstacle(state, config, rng);
        state.obstacles.push(obstacle);
        state.spawn_timer_ms = next_spawn_delay_ms(state.score, config, rng);
    }

    for obstacle in &mut state.obstacles {
        obstacle.pos.x -= speed;
    }
    state.obstacles.retain(|o| o.right() > config.despawn_x);

    // --- Collision ---
    let player = state.player_box(config);
    if let Some(hit) = first_hit(&player, &state.obstacles) {
        let obstacle_id = hit.id;
        state.status = RunStatus::GameOver;
        return TickOutcome::Collided { obstacle_id };
    }

    state.score += config.score_per_tick();
    TickOutcome::Advanced
}

fn integrate_lift(state: &mut RunnerState) {
    state.lift = (state.lift + state.velocity).max(0.0);
    if state.lift == 0.0 && state.velocity < 0.0 {
        state.velocity = 0.0;
    }
}

/// Ease toward the cumulative target while airborne, snap on the ground
fn update_rotation(state: &mut RunnerState, config: &RunnerConfig) {
    if state.lift > 0.0 {
        state.rotation_ticks += 1;
        let t = state.rotation_ticks as f32 / config.rotation_ticks_per_jump.max(1.0);
        let eased = ease_out(t, config.rotation_ease_power);
        let span = state.rotation_target - state.rotation_start;
        state.rotation = state.rotation_start + span * eased;
    } else {
        state.rotation = state.rotation_target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRandom, SimRng};
    use crate::runner::state::{Obstacle, ObstacleKind};
    use glam::Vec2;
    use proptest::prelude::*;

    fn running(config: &RunnerConfig) -> RunnerState {
        let mut state = RunnerState::new(config);
        state.status = RunStatus::Running;
        state
    }

    #[test]
    fn test_idle_run_scores_at_fixed_rate() {
        let config = RunnerConfig::default();
        let mut state = running(&config);
        let mut rng = ScriptedRandom::new(std::iter::empty());

        for _ in 0..10 {
            assert_eq!(tick(&mut state, &config, &mut rng), TickOutcome::Advanced);
        }

        let expected = 10.0 * (config.score_rate_per_second / 60.0);
        assert!((state.score - expected).abs() < 1e-4);
        assert_eq!(state.lift, 0.0);
        assert_eq!(state.velocity, 0.0);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_skipped_when_not_running() {
        let config = RunnerConfig::default();
        let mut state = RunnerState::new(&config);
        let mut rng = ScriptedRandom::new(std::iter::empty());
        assert_eq!(tick(&mut state, &config, &mut rng), TickOutcome::Skipped);
        assert_eq!(state.ticks, 0);
    }

    #[test]
    fn test_jump_arc_lands_and_snaps_rotation() {
        let config = RunnerConfig::default();
        let mut state = running(&config);
        let mut rng = ScriptedRandom::new(std::iter::empty());
        state.apply_jump_impulse(&config);

        tick(&mut state, &config, &mut rng);
        assert!((state.lift - (10.6 - 0.58)).abs() < 1e-4);
        assert!(state.rotation > 0.0 && state.rotation < 90.0);

        let mut airborne = 1;
        while state.lift > 0.0 {
            tick(&mut state, &config, &mut rng);
            airborne += 1;
            assert!(airborne < 60, "jump never landed");
        }
        assert_eq!(state.velocity, 0.0);
        assert_eq!(state.rotation, 90.0);
    }

    #[test]
    fn test_fast_fall_shortens_jump() {
        let config = RunnerConfig::default();
        let mut rng = ScriptedRandom::new(std::iter::empty());

        let airtime = |crouch: bool, rng: &mut ScriptedRandom| {
            let mut state = running(&config);
            state.apply_jump_impulse(&config);
            state.crouching = crouch;
            let mut ticks = 0;
            loop {
                tick(&mut state, &config, rng);
                ticks += 1;
                if state.lift == 0.0 {
                    return ticks;
                }
            }
        };

        assert!(airtime(true, &mut rng) < airtime(false, &mut rng));
    }

    #[test]
    fn test_held_jump_relaunches_on_landing() {
        let config = RunnerConfig::default();
        let mut state = running(&config);
        let mut rng = ScriptedRandom::new(std::iter::empty());
        state.jump_held = true;

        tick(&mut state, &config, &mut rng);
        assert!(state.lift > 0.0);
        assert_eq!(state.rotation_target, 90.0);

        // Ride the first jump down; the landing tick launches the second
        while state.rotation_target < 180.0 {
            tick(&mut state, &config, &mut rng);
            assert!(state.ticks < 100);
        }
        assert!(state.lift > 0.0);
        // Eases on from wherever the first spin stood, no snap to 180
        assert!(state.rotation > 80.0 && state.rotation < 180.0);
    }

    #[test]
    fn test_overlapping_obstacle_ends_run_without_scoring() {
        let config = RunnerConfig::default();
        let mut state = running(&config);
        let mut rng = ScriptedRandom::new(std::iter::empty());
        let id = state.next_obstacle_id();
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Ground,
            pos: Vec2::new(0.0, 100.0),
            size: Vec2::new(200.0, 80.0),
        });

        let outcome = tick(&mut state, &config, &mut rng);
        assert_eq!(outcome, TickOutcome::Collided { obstacle_id: id });
        assert_eq!(state.status, RunStatus::GameOver);
        assert_eq!(state.score, 0.0);
        // Frozen afterwards
        assert_eq!(tick(&mut state, &config, &mut rng), TickOutcome::Skipped);
    }

    #[test]
    fn test_obstacles_scroll_and_despawn() {
        let config = RunnerConfig::default();
        let mut state = running(&config);
        let mut rng = ScriptedRandom::new(std::iter::empty());
        let far = state.next_obstacle_id();
        state.obstacles.push(Obstacle {
            id: far,
            kind: ObstacleKind::Ground,
            pos: Vec2::new(400.0, 150.0),
            size: Vec2::new(20.0, 30.0),
        });
        let gone = state.next_obstacle_id();
        state.obstacles.push(Obstacle {
            id: gone,
            kind: ObstacleKind::Flying,
            pos: Vec2::new(-36.0, 100.0),
            size: Vec2::new(20.0, 22.0),
        });

        tick(&mut state, &config, &mut rng);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].id, far);
        assert_eq!(state.obstacles[0].pos.x, 395.0);
    }

    #[test]
    fn test_countdown_spawns_and_rearms() {
        let config = RunnerConfig::default();
        let mut state = running(&config);
        state.spawn_timer_ms = 1.0;
        // ground, width, height, countdown jitter
        let mut rng = ScriptedRandom::new([0.0, 0.0, 0.0, 0.5]);

        tick(&mut state, &config, &mut rng);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].pos.x, 630.0 - config.base_speed);
        assert!((state.spawn_timer_ms - (780.0 + 310.0)).abs() < 1e-3);
    }

    #[test]
    fn test_ease_out_endpoints() {
        assert_eq!(ease_out(0.0, 1.65), 0.0);
        assert_eq!(ease_out(1.0, 1.65), 1.0);
        assert_eq!(ease_out(3.0, 1.65), 1.0);
        assert!(ease_out(0.5, 1.65) > 0.5);
    }

    proptest! {
        #[test]
        fn prop_physics_bounds_hold(
            seed in any::<u64>(),
            inputs in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..600),
        ) {
            let config = RunnerConfig::default();
            let mut state = running(&config);
            let mut rng = SimRng::seeded(seed);

            for (jump, crouch) in inputs {
                state.jump_held = jump;
                state.crouching = crouch;
                let before: Vec<(u64, f32)> =
                    state.obstacles.iter().map(|o| (o.id, o.pos.x)).collect();

                if tick(&mut state, &config, &mut rng) == TickOutcome::Skipped {
                    break;
                }

                prop_assert!(state.lift >= 0.0);
                prop_assert!(state.velocity >= config.max_fall_velocity);
                prop_assert!(state.obstacles.windows(2).all(|w| w[0].id < w[1].id));
                for o in &state.obstacles {
                    if let Some((_, x)) = before.iter().find(|(id, _)| *id == o.id) {
                        prop_assert!(o.pos.x < *x);
                    }
                }
            }
        }
    }
}
