// ABOUTME: Injectable randomness for the heart-rate generator
// ABOUTME: Wraps rand RNGs behind a small trait so tests can script exact draws
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(test)]
use std::collections::VecDeque;

/// Source of the random draws the generator needs
///
/// Implementations must be cheap to call once per tick. The generator draws in
/// a fixed order (noise, injection coin, arrhythmia kind, magnitude), which is
/// what scripted test sources rely on.
pub trait RandomSource {
    /// Uniform integer in `[low, high]`, both ends inclusive
    fn uniform_int(&mut self, low: i32, high: i32) -> i32;

    /// Uniform float in `[low, high)`
    fn uniform_f64(&mut self, low: f64, high: f64) -> f64;

    /// `true` with the given probability
    fn chance(&mut self, probability: f64) -> bool;

    /// Fair coin
    fn coin_flip(&mut self) -> bool {
        self.chance(0.5)
    }
}

/// [`RandomSource`] backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wrap an existing generator
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<ChaCha8Rng> {
    /// Deterministic source for reproducible sessions
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RngSource<StdRng> {
    /// Source seeded from operating system entropy
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn uniform_int(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn uniform_f64(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn coin_flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}

/// Scripted draws for exact-sequence tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    ints: VecDeque<i32>,
    floats: VecDeque<f64>,
    flags: VecDeque<bool>,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(ints: &[i32], floats: &[f64], flags: &[bool]) -> Self {
        Self {
            ints: ints.iter().copied().collect(),
            floats: floats.iter().copied().collect(),
            flags: flags.iter().copied().collect(),
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.ints.is_empty() && self.floats.is_empty() && self.flags.is_empty()
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn uniform_int(&mut self, low: i32, high: i32) -> i32 {
        let value = self.ints.pop_front().expect("scripted int exhausted");
        assert!((low..=high).contains(&value), "{value} outside [{low}, {high}]");
        value
    }

    fn uniform_f64(&mut self, low: f64, high: f64) -> f64 {
        let value = self.floats.pop_front().expect("scripted float exhausted");
        assert!((low..high).contains(&value), "{value} outside [{low}, {high})");
        value
    }

    fn chance(&mut self, _probability: f64) -> bool {
        self.flags.pop_front().expect("scripted flag exhausted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_sources_are_reproducible() {
        let mut a = RngSource::seeded(42);
        let mut b = RngSource::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.uniform_int(60, 75), b.uniform_int(60, 75));
            assert!((a.uniform_f64(-2.0, 2.0) - b.uniform_f64(-2.0, 2.0)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_ranges_are_respected() {
        let mut source = RngSource::seeded(7);
        for _ in 0..1_000 {
            let n = source.uniform_int(30, 50);
            assert!((30..=50).contains(&n));
            let x = source.uniform_f64(-2.0, 2.0);
            assert!((-2.0..2.0).contains(&x));
        }
    }

    #[test]
    fn test_degenerate_ranges_return_low() {
        let mut source = RngSource::seeded(1);
        assert_eq!(source.uniform_int(70, 70), 70);
        assert_eq!(source.uniform_int(80, 70), 80);
        assert!((source.uniform_f64(1.5, 1.5) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_chance_extremes() {
        let mut source = RngSource::seeded(3);
        assert!((0..100).all(|_| !source.chance(0.0)));
        assert!((0..100).all(|_| source.chance(1.0)));
        assert!(!source.chance(-1.0));
    }
}
