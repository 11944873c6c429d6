//! Random source abstraction
//!
//! Spawning and the price process draw from a `RandomSource` so tests can
//! script exact sequences. Production runs use a PCG stream seeded from
//! entropy; reproducibility across runs is not a goal.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform source of `f64` in `[0, 1)`
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform value in `[lo, lo + span)`
    fn range(&mut self, lo: f64, span: f64) -> f64 {
        lo + self.next_f64() * span
    }

    /// Uniformly pick one element (None for an empty slice)
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = (self.next_f64() * items.len() as f64).floor() as usize;
        items.get(idx.min(items.len() - 1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Production generator
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: Pcg32,
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::seeded(rand::random::<u64>())
    }
}

impl RandomSource for SimRng {
    fn next_f64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }
}

/// Replays a fixed sequence, then returns `fallback` forever
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback: 0.5,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Queue more values behind the remaining ones
    pub fn extend(&mut self, values: impl IntoIterator<Item = f64>) {
        self.values.extend(values);
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.values.pop_front().unwrap_or(self.fallback)
    }
}
