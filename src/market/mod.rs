//! Memecoin market simulation
//!
//! One logical tick per second:
//! - Regime-switching trend bias with anti-streak redraws
//! - Noise, mean reversion toward a slow anchor and rare shocks
//! - Bounded candle history with a scrollable viewport
//! - Single leveraged position with an automatic liquidation monitor

pub mod candle;
pub mod chart;
pub mod config;
pub mod engine;
pub mod format;
pub mod position;
pub mod price;
pub mod trend;

pub use candle::{Candle, CandleHistory};
pub use chart::ChartView;
pub use config::{MarketConfig, ProcessParams};
pub use engine::{MarketEngine, MarketEvent, MarketSnapshot, MarketTick};
pub use format::{format_currency, format_market_cap, format_pnl_percent};
pub use position::{Account, ClosedTrade, Liquidation, Position, Side};
pub use price::{PriceProcess, burn_in};
pub use trend::TrendRegime;
