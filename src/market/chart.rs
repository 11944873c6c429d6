//! Chart viewport over the candle history
//!
//! The offset counts candles back from the live edge. While the viewer is
//! scrolled back, each new candle bumps the offset so the same candles stay
//! on screen.

use serde::{Deserialize, Serialize};

use super::candle::{Candle, CandleHistory};

/// Vertical pan limit, in chart percent
pub const MAX_VERTICAL_OFFSET: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartView {
    visible: usize,
    offset: usize,
    vertical: f64,
}

impl ChartView {
    pub fn new(visible: usize) -> Self {
        Self {
            visible: visible.max(1),
            offset: 0,
            vertical: 0.0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn vertical(&self) -> f64 {
        self.vertical
    }

    pub fn is_live(&self) -> bool {
        self.offset == 0
    }

    pub fn max_offset(&self, len: usize) -> usize {
        len.saturating_sub(self.visible)
    }

    /// Scroll back (positive) or forward (negative) by whole candles
    pub fn scroll_by(&mut self, delta: i64, len: usize) {
        let target = (self.offset as i64).saturating_add(delta).max(0) as usize;
        self.offset = target.min(self.max_offset(len));
    }

    pub fn set_vertical(&mut self, offset: f64) {
        self.vertical = if offset.is_finite() {
            offset.clamp(-MAX_VERTICAL_OFFSET, MAX_VERTICAL_OFFSET)
        } else {
            0.0
        };
    }

    /// Keep a scrolled-back view pinned when a candle is appended
    pub fn on_candle_added(&mut self, len: usize) {
        if self.offset > 0 {
            self.offset = (self.offset + 1).min(self.max_offset(len));
        }
    }

    /// Index range `[start, end)` currently on screen
    pub fn window(&self, len: usize) -> (usize, usize) {
        let offset = self.offset.min(self.max_offset(len));
        let start = len.saturating_sub(self.visible + offset);
        (start, (start + self.visible).min(len))
    }

    pub fn visible_candles(&self, history: &CandleHistory) -> Vec<Candle> {
        let (start, end) = self.window(history.len());
        history.slice(start, end)
    }

    pub fn reset(&mut self) {
        self.offset = 0;
        self.vertical = 0.0;
    }
}
