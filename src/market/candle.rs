//! OHLC candles and the bounded price history

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Candle for a move from `open` to `close`; wicks bound both ends
    pub fn between(open: f64, close: f64) -> Self {
        Self {
            open,
            high: open.max(close),
            low: open.min(close),
            close,
        }
    }

    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }

    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

/// Sliding window of candles, oldest evicted past the cap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleHistory {
    candles: VecDeque<Candle>,
    cap: usize,
}

impl CandleHistory {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            candles: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, candle: Candle) {
        if self.candles.len() == self.cap {
            self.candles.pop_front();
        }
        self.candles.push_back(candle);
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.last().map(|c| c.close)
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    /// Copy out `range` (clamped to the history)
    pub fn slice(&self, start: usize, end: usize) -> Vec<Candle> {
        let end = end.min(self.candles.len());
        let start = start.min(end);
        self.candles.range(start..end).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_orders_wicks() {
        let down = Candle::between(100.0, 90.0);
        assert_eq!(down.high, 100.0);
        assert_eq!(down.low, 90.0);
        assert!(!down.is_up());
        assert!(down.is_well_formed());
        assert!(Candle::between(5.0, 5.0).is_up());
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = CandleHistory::new(3);
        for i in 0..5 {
            history.push(Candle::between(i as f64, i as f64 + 1.0));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().next().map(|c| c.open), Some(2.0));
        assert_eq!(history.last_close(), Some(5.0));
    }

    #[test]
    fn test_slice_clamps() {
        let mut history = CandleHistory::new(10);
        for i in 0..4 {
            history.push(Candle::between(i as f64, i as f64));
        }
        assert_eq!(history.slice(2, 99).len(), 2);
        assert!(history.slice(7, 9).is_empty());
    }
}
