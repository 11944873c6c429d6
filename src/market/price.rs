//! Stochastic price process
//!
//! `next = max(floor, prev * (1 + bias + noise + reversion + shock))`.
//! Draw order per step: regime (see `TrendRegime::advance`), noise, shock
//! roll, and only when a shock fires: coin flip for a flat trend, sign roll,
//! magnitude.

use serde::{Deserialize, Serialize};

use super::candle::{Candle, CandleHistory};
use super::config::{MarketConfig, ProcessParams};
use super::trend::{TrendRegime, direction_of};
use crate::rng::RandomSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceProcess {
    pub regime: TrendRegime,
    /// Slow moving average used as the mean-reversion target
    pub anchor: f64,
    pub price: f64,
    floor: f64,
}

impl PriceProcess {
    /// Fresh regime, anchored at `start`
    pub fn new(start: f64, floor: f64) -> Self {
        let floor = if floor.is_finite() { floor.max(0.0) } else { 0.0 };
        let start = if start.is_finite() { start.max(floor) } else { floor };
        Self {
            regime: TrendRegime::default(),
            anchor: start,
            price: start,
            floor,
        }
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Advance one tick and return the new price
    pub fn step(&mut self, params: &ProcessParams, rng: &mut impl RandomSource) -> f64 {
        self.regime.advance(params, rng);

        let previous = self.price;
        let bias = self.regime.bias;
        let noise = (rng.next_f64() - 0.5) * params.noise_amplitude;
        let reversion = if self.anchor > 0.0 {
            (self.anchor - previous) / self.anchor * params.reversion_strength
        } else {
            0.0
        };
        let shock = self.draw_shock(params, rng);

        let raw = previous * (1.0 + bias + noise + reversion + shock);
        let next = if raw.is_finite() {
            raw.max(self.floor)
        } else {
            previous
        };

        self.anchor = self.anchor * params.anchor_decay + next * (1.0 - params.anchor_decay);
        self.price = next;
        next
    }

    fn draw_shock(&self, params: &ProcessParams, rng: &mut impl RandomSource) -> f64 {
        if !rng.chance(params.shock_chance) {
            return 0.0;
        }

        let trend = match direction_of(self.regime.bias) {
            0 => {
                if rng.next_f64() > 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            d => d as f64,
        };
        let sign = if rng.chance(params.shock_trend_bias) {
            trend
        } else {
            -trend
        };
        let magnitude = rng.range(params.shock_min, params.shock_span);
        log::debug!("Price shock {:+.3}", sign * magnitude);
        sign * magnitude
    }

    /// One tick rendered as a candle from the previous close
    pub fn step_candle(&mut self, params: &ProcessParams, rng: &mut impl RandomSource) -> Candle {
        let open = self.price;
        let close = self.step(params, rng);
        Candle::between(open, close)
    }
}

/// Pre-generate a full history with a throwaway process so charts never start empty
pub fn burn_in(config: &MarketConfig, rng: &mut impl RandomSource) -> CandleHistory {
    let mut process = PriceProcess::new(config.starting_price, config.price_floor);
    let mut history = CandleHistory::new(config.max_candles);
    for _ in 0..config.max_candles {
        history.push(process.step_candle(&config.process, rng));
    }
    history
}
