//! Tick scheduling shared by both engines
//!
//! The runner consumes wall-clock deltas into a fixed-step budget; the market
//! is polled often but only allowed one logical tick per period.

/// Fixed-timestep accumulator
#[derive(Debug, Clone)]
pub struct FixedStep {
    step_ms: f32,
    max_delta_ms: f32,
    accumulator: f32,
}

impl FixedStep {
    pub fn new(step_ms: f32, max_delta_ms: f32) -> Self {
        Self {
            step_ms: step_ms.max(f32::EPSILON),
            max_delta_ms: max_delta_ms.max(0.0),
            accumulator: 0.0,
        }
    }

    /// Add a wall-clock delta, capped so a resumed tab doesn't replay seconds of ticks
    pub fn push(&mut self, delta_ms: f32) {
        let delta = if delta_ms.is_finite() {
            delta_ms.clamp(0.0, self.max_delta_ms)
        } else {
            0.0
        };
        self.accumulator += delta;
    }

    /// Take one step out of the budget if a whole step is available
    pub fn try_consume(&mut self) -> bool {
        if self.accumulator >= self.step_ms {
            self.accumulator -= self.step_ms;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    pub fn step_ms(&self) -> f32 {
        self.step_ms
    }

    pub fn pending_ms(&self) -> f32 {
        self.accumulator
    }
}

/// At most one firing per period, however often it is polled
#[derive(Debug, Clone)]
pub struct IntervalGate {
    period_ms: u64,
    last: Option<u64>,
}

impl IntervalGate {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last: None,
        }
    }

    /// Returns true (and restarts the period) when a full period has elapsed
    pub fn ready(&mut self, now_ms: u64) -> bool {
        match self.last {
            Some(last) if now_ms.saturating_sub(last) < self.period_ms => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }

    /// Restart the period at `now_ms` without firing
    pub fn rearm(&mut self, now_ms: u64) {
        self.last = Some(now_ms);
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_consumes_whole_steps() {
        let mut clock = FixedStep::new(10.0, 100.0);
        clock.push(35.0);
        let mut steps = 0;
        while clock.try_consume() {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert!((clock.pending_ms() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_fixed_step_caps_large_deltas() {
        let mut clock = FixedStep::new(10.0, 100.0);
        clock.push(5_000.0);
        let mut steps = 0;
        while clock.try_consume() {
            steps += 1;
        }
        assert_eq!(steps, 10);
    }

    #[test]
    fn test_fixed_step_ignores_garbage() {
        let mut clock = FixedStep::new(10.0, 100.0);
        clock.push(f32::NAN);
        clock.push(-50.0);
        clock.push(f32::INFINITY);
        assert_eq!(clock.pending_ms(), 0.0);
        assert!(!clock.try_consume());
    }

    #[test]
    fn test_gate_collapses_overlapping_polls() {
        let mut gate = IntervalGate::new(1000);
        assert!(gate.ready(0));
        assert!(!gate.ready(120));
        assert!(!gate.ready(999));
        assert!(gate.ready(1000));
        assert!(!gate.ready(1500));
        assert!(gate.ready(2100));
    }

    #[test]
    fn test_gate_rearm_delays_next_tick() {
        let mut gate = IntervalGate::new(1000);
        gate.rearm(500);
        assert!(!gate.ready(600));
        assert!(gate.ready(1500));
    }
}
