//! Trend regime selection
//!
//! A regime is a bias held for a few ticks. Redraws avoid long runs in one
//! direction with two tiers: a hard ban once the streak limit is reached,
//! otherwise a soft, probabilistic ban that still allows a flat pause.

use serde::{Deserialize, Serialize};

use super::config::ProcessParams;
use crate::rng::RandomSource;

/// Sign of a bias as -1, 0 or 1
#[inline]
pub fn direction_of(bias: f64) -> i8 {
    if bias > 0.0 {
        1
    } else if bias < 0.0 {
        -1
    } else {
        0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendRegime {
    pub bias: f64,
    pub ticks_remaining: u32,
    /// Consecutive nonzero picks in the same direction
    pub streak: u32,
    pub last_direction: i8,
}

impl TrendRegime {
    /// Redraw if expired (or on the random override), then count this tick
    pub fn advance(&mut self, params: &ProcessParams, rng: &mut impl RandomSource) {
        if self.ticks_remaining == 0 || rng.chance(params.redraw_chance) {
            self.bias = self.pick_bias(params, rng);
            let jitter = (rng.next_f64() * params.regime_tick_jitter as f64).floor() as u32;
            self.ticks_remaining = params.regime_min_ticks + jitter;
            log::debug!(
                "Trend regime: bias {:+.3} for {} ticks (streak {})",
                self.bias,
                self.ticks_remaining,
                self.streak
            );
        }
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
    }

    /// Choose the next bias and update the streak bookkeeping
    pub fn pick_bias(&mut self, params: &ProcessParams, rng: &mut impl RandomSource) -> f64 {
        let last = self.last_direction;
        let candidates: Vec<f64> = if self.streak >= params.streak_limit && last != 0 {
            params
                .trend_biases
                .iter()
                .copied()
                .filter(|&b| direction_of(b) != last)
                .collect()
        } else if last != 0 && rng.chance(params.soft_exclusion_chance) {
            params
                .trend_biases
                .iter()
                .copied()
                .filter(|&b| direction_of(b) != last || b == 0.0)
                .collect()
        } else {
            params.trend_biases.clone()
        };

        let bias = rng.pick(&candidates).copied().unwrap_or(0.0);
        let direction = direction_of(bias);

        if direction != 0 && direction == last {
            self.streak += 1;
        } else if direction != 0 {
            self.streak = 1;
        } else {
            self.streak = 0;
        }
        self.last_direction = direction;

        bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRandom, SimRng};
    use proptest::prelude::*;

    #[test]
    fn test_streak_counts_same_direction() {
        let params = ProcessParams::default();
        let mut regime = TrendRegime::default();
        // Highest bias, then soft roll fails (0.9), highest again
        let mut rng = ScriptedRandom::new([0.99, 0.9, 0.99]);
        assert_eq!(regime.pick_bias(&params, &mut rng), 0.014);
        assert_eq!(regime.streak, 1);
        assert_eq!(regime.pick_bias(&params, &mut rng), 0.014);
        assert_eq!(regime.streak, 2);
        assert_eq!(regime.last_direction, 1);
    }

    #[test]
    fn test_hard_limit_bans_direction_and_zero_resets() {
        let params = ProcessParams::default();
        let mut regime = TrendRegime {
            streak: 2,
            last_direction: 1,
            ..Default::default()
        };
        // Candidates are the three negatives plus zero; top pick is zero
        let mut rng = ScriptedRandom::new([0.99]);
        assert_eq!(regime.pick_bias(&params, &mut rng), 0.0);
        assert_eq!(regime.streak, 0);
        assert_eq!(regime.last_direction, 0);
        // The hard branch takes no soft roll
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_soft_exclusion_keeps_pause() {
        let params = ProcessParams::default();
        let mut regime = TrendRegime {
            streak: 1,
            last_direction: -1,
            ..Default::default()
        };
        // Soft roll hits (0.1 < 0.45); candidates [0, .006, .01, .014]; first is the pause
        let mut rng = ScriptedRandom::new([0.1, 0.0]);
        assert_eq!(regime.pick_bias(&params, &mut rng), 0.0);

        regime.last_direction = -1;
        regime.streak = 1;
        let mut rng = ScriptedRandom::new([0.1, 0.99]);
        assert_eq!(regime.pick_bias(&params, &mut rng), 0.014);
        assert_eq!(regime.streak, 1);
    }

    #[test]
    fn test_expired_regime_redraws_length() {
        let params = ProcessParams::default();
        let mut regime = TrendRegime::default();
        // pick index 3 (zero), length jitter 0.99 => 4 + 6
        let mut rng = ScriptedRandom::new([0.5, 0.99]);
        regime.advance(&params, &mut rng);
        assert_eq!(regime.bias, 0.0);
        assert_eq!(regime.ticks_remaining, 9);
    }

    #[test]
    fn test_override_roll_only_when_active() {
        let params = ProcessParams::default();
        let mut regime = TrendRegime {
            bias: 0.01,
            ticks_remaining: 3,
            streak: 1,
            last_direction: 1,
        };
        // 0.5 > 0.08: no override
        let mut rng = ScriptedRandom::new([0.5]);
        regime.advance(&params, &mut rng);
        assert_eq!(regime.bias, 0.01);
        assert_eq!(regime.ticks_remaining, 2);
        assert_eq!(rng.remaining(), 0);
    }

    proptest! {
        #[test]
        fn prop_never_three_in_a_row(seed in any::<u64>()) {
            let params = ProcessParams::default();
            let mut regime = TrendRegime::default();
            let mut rng = SimRng::seeded(seed);
            for _ in 0..200 {
                let bias = regime.pick_bias(&params, &mut rng);
                prop_assert!(params.trend_biases.contains(&bias));
                prop_assert!(regime.streak <= params.streak_limit);
            }
        }
    }
}
