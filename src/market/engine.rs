//! Market engine
//!
//! Owns the price process, candle history, account and chart viewport. The
//! host polls `advance` frequently; the internal gate turns that into at most
//! one logical tick per period. Every tick runs the liquidation monitor.

use serde::Serialize;

use super::candle::{Candle, CandleHistory};
use super::chart::ChartView;
use super::config::MarketConfig;
use super::format::{format_currency, format_market_cap, format_pnl_percent};
use super::position::{Account, ClosedTrade, Liquidation, Position, Side};
use super::price::{PriceProcess, burn_in};
use crate::clock::IntervalGate;
use crate::rng::{RandomSource, SimRng};

/// Something the player should be told about
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    Opened(Position),
    Closed(ClosedTrade),
    Liquidated(Liquidation),
    Reset { balance: f64 },
}

impl MarketEvent {
    /// One-line status message
    pub fn describe(&self) -> String {
        match self {
            MarketEvent::Opened(p) => {
                format!("{} opened at {}", p.side.as_str(), format_market_cap(p.entry_price))
            }
            MarketEvent::Closed(t) => {
                format!("Trade closed at {}", format_pnl_percent(t.pnl_multiple))
            }
            MarketEvent::Liquidated(l) => {
                format!("Liquidated at {}", format_pnl_percent(l.pnl_multiple))
            }
            MarketEvent::Reset { balance } => format!("Reset to {}", format_currency(*balance)),
        }
    }
}

/// Result of one logical tick
#[derive(Debug, Clone, PartialEq)]
pub struct MarketTick {
    pub price: f64,
    pub candle: Candle,
    pub liquidation: Option<Liquidation>,
}

/// Immutable view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub balance: f64,
    pub price: f64,
    pub leverage: f64,
    pub position: Option<Position>,
    pub pnl_multiple: f64,
    pub projected_payout: f64,
    pub candles: Vec<Candle>,
    pub chart_offset: usize,
    pub chart_vertical: f64,
    pub ticks: u64,
}

pub struct MarketEngine<R: RandomSource = SimRng> {
    config: MarketConfig,
    rng: R,
    process: PriceProcess,
    history: CandleHistory,
    account: Account,
    chart: ChartView,
    gate: IntervalGate,
    ticks: u64,
}

impl MarketEngine<SimRng> {
    pub fn new(config: MarketConfig) -> Self {
        Self::with_rng(config, SimRng::from_entropy())
    }
}

impl<R: RandomSource> MarketEngine<R> {
    /// Burn in a fresh history, then start live ticking from its last close
    pub fn with_rng(config: MarketConfig, mut rng: R) -> Self {
        let history = burn_in(&config, &mut rng);
        Self::from_history(config, rng, history)
    }

    /// Start from an existing history (a fresh live regime, anchored at its last close)
    pub fn from_history(config: MarketConfig, rng: R, history: CandleHistory) -> Self {
        let price = history.last_close().unwrap_or(config.starting_price);
        Self {
            process: PriceProcess::new(price, config.price_floor),
            account: Account::new(config.starting_balance),
            chart: ChartView::new(config.visible_candles),
            gate: IntervalGate::new(config.tick_interval_ms),
            history,
            rng,
            config,
            ticks: 0,
        }
    }

    /// Poll from the driver clock; runs a tick only if the period has elapsed
    pub fn advance(&mut self, now_ms: u64) -> Option<MarketTick> {
        if !self.gate.ready(now_ms) {
            return None;
        }
        Some(self.tick())
    }

    fn tick(&mut self) -> MarketTick {
        let open = self.process.price;
        let price = self.process.step(&self.config.process, &mut self.rng);
        let candle = Candle::between(open, price);
        self.history.push(candle);
        self.chart.on_candle_added(self.history.len());
        self.ticks += 1;

        let liquidation = self.account.check_liquidation(price, self.config.leverage);
        if let Some(liq) = &liquidation {
            log::info!(
                "Market: {} liquidated at {} (entry {}, collateral {})",
                liq.position.side.as_str(),
                format_market_cap(price),
                format_market_cap(liq.position.entry_price),
                format_currency(liq.position.collateral)
            );
        }

        MarketTick {
            price,
            candle,
            liquidation,
        }
    }

    /// Open a position at the current price; size is clamped, never rejected for range
    pub fn open(&mut self, side: Side, requested: f64) -> Option<MarketEvent> {
        let position = self
            .account
            .open(side, requested, self.price(), self.config.min_trade)?;
        log::info!(
            "Market: {} {} at {}",
            side.as_str(),
            format_currency(position.collateral),
            format_market_cap(position.entry_price)
        );
        Some(MarketEvent::Opened(position))
    }

    pub fn close(&mut self) -> Option<MarketEvent> {
        let trade = self.account.close(self.price(), self.config.leverage)?;
        log::info!(
            "Market: closed {} at {} for {}",
            trade.position.side.as_str(),
            format_pnl_percent(trade.pnl_multiple),
            format_currency(trade.payout)
        );
        Some(MarketEvent::Closed(trade))
    }

    /// Start over: fresh history, balance and regime; next tick a full period from `now_ms`
    pub fn reset(&mut self, now_ms: u64) -> MarketEvent {
        self.history = burn_in(&self.config, &mut self.rng);
        let price = self.history.last_close().unwrap_or(self.config.starting_price);
        self.process = PriceProcess::new(price, self.config.price_floor);
        self.account = Account::new(self.config.starting_balance);
        self.chart.reset();
        self.gate.rearm(now_ms);
        self.ticks = 0;
        log::info!("Market: reset at {}", format_market_cap(price));
        MarketEvent::Reset {
            balance: self.config.starting_balance,
        }
    }

    pub fn scroll_chart(&mut self, delta_candles: i64) {
        self.chart.scroll_by(delta_candles, self.history.len());
    }

    pub fn pan_chart_vertical(&mut self, offset: f64) {
        self.chart.set_vertical(offset);
    }

    pub fn price(&self) -> f64 {
        self.process.price
    }

    pub fn balance(&self) -> f64 {
        self.account.balance()
    }

    pub fn position(&self) -> Option<&Position> {
        self.account.position()
    }

    pub fn pnl_multiple(&self) -> f64 {
        self.position()
            .map(|p| p.pnl_multiple(self.price(), self.config.leverage))
            .unwrap_or(0.0)
    }

    /// Largest size the trade input should offer
    pub fn max_trade_amount(&self) -> f64 {
        round_cents(self.balance().max(self.config.min_trade))
    }

    /// Balance eligible for the leaderboard: strictly above the starting balance once
    /// rounded to cents, which is the value actually sent
    pub fn submission_value(&self) -> Option<f64> {
        let value = round_cents(self.balance());
        (value > self.config.starting_balance).then_some(value)
    }

    pub fn history(&self) -> &CandleHistory {
        &self.history
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        let price = self.price();
        let position = self.position().copied();
        MarketSnapshot {
            balance: self.balance(),
            price,
            leverage: self.config.leverage,
            pnl_multiple: self.pnl_multiple(),
            projected_payout: position
                .map(|p| p.payout(price, self.config.leverage))
                .unwrap_or(0.0),
            position,
            candles: self.chart.visible_candles(&self.history),
            chart_offset: self.chart.offset(),
            chart_vertical: self.chart.vertical(),
            ticks: self.ticks,
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
