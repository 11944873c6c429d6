//! Market tuning
//!
//! Prices are market caps in dollars; all rates are per logical tick.

use serde::{Deserialize, Serialize};

use crate::consts::{MARKET_POLL_MS, MARKET_TICK_MS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    // === Account ===
    pub starting_balance: f64,
    pub leverage: f64,
    pub min_trade: f64,
    pub default_trade: f64,

    // === Timing ===
    pub tick_interval_ms: u64,
    pub poll_interval_ms: u64,

    // === History ===
    pub starting_price: f64,
    pub price_floor: f64,
    pub max_candles: usize,
    pub visible_candles: usize,

    // === Price process ===
    pub process: ProcessParams,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1_000.0,
            leverage: 5.0,
            min_trade: 10.0,
            default_trade: 250.0,

            tick_interval_ms: MARKET_TICK_MS,
            poll_interval_ms: MARKET_POLL_MS,

            starting_price: 1_000_000.0,
            price_floor: 25_000.0,
            max_candles: 320,
            visible_candles: 56,

            process: ProcessParams::default(),
        }
    }
}

/// Coefficients of the stochastic price step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessParams {
    /// Discrete bias menu, negative to positive
    pub trend_biases: Vec<f64>,
    /// Per-tick chance to redraw the regime early
    pub redraw_chance: f64,
    pub regime_min_ticks: u32,
    /// Regime length is `min + floor(r * jitter)`
    pub regime_tick_jitter: u32,
    /// Same-direction picks in a row before that direction is banned
    pub streak_limit: u32,
    /// Chance to avoid repeating a direction below the hard limit
    pub soft_exclusion_chance: f64,
    /// Noise is `(r - 0.5) * amplitude`
    pub noise_amplitude: f64,
    pub reversion_strength: f64,
    pub anchor_decay: f64,
    pub shock_chance: f64,
    pub shock_min: f64,
    pub shock_span: f64,
    /// Chance a shock follows the trend direction
    pub shock_trend_bias: f64,
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self {
            trend_biases: vec![-0.014, -0.01, -0.006, 0.0, 0.006, 0.01, 0.014],
            redraw_chance: 0.08,
            regime_min_ticks: 4,
            regime_tick_jitter: 7,
            streak_limit: 2,
            soft_exclusion_chance: 0.45,
            noise_amplitude: 0.044,
            reversion_strength: 0.0038,
            anchor_decay: 0.995,
            shock_chance: 0.10,
            shock_min: 0.04,
            shock_span: 0.13,
            shock_trend_bias: 0.65,
        }
    }
}
