// ABOUTME: Stateful synthetic heart-rate generator for live streams and history backfill
// ABOUTME: Base rate plus slow sine wave plus noise, with optional injected arrhythmias
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::activity_table::ActivityRangeTable;
use crate::random::RandomSource;
use pulse_core::constants::heart_rate::{
    BRADYCARDIA_DROP, INJECTION_PROBABILITY, MAX_BPM, MIN_BPM, NOISE_BOUND, TACHYCARDIA_SPIKE,
    WAVE_AMPLITUDE, WAVE_TICK_DIVISOR,
};
use pulse_core::models::ActivityLevel;
use serde::{Deserialize, Serialize};

/// Transient perturbation applied to a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectedArrhythmia {
    /// Sudden spike upward
    Tachycardia,
    /// Sudden drop downward
    Bradycardia,
}

/// One generated value plus what, if anything, was injected into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedBeat {
    /// Clamped beats per minute
    pub bpm: i32,
    /// Injected perturbation, if any
    pub injected: Option<InjectedArrhythmia>,
}

/// Synthetic heart-rate signal for one simulated subject
///
/// Each value is `base_rate + 3·sin(ticks / 10) + U(-2, 2)`, truncated toward
/// zero, optionally perturbed by an injected arrhythmia, then clamped to
/// `[40, 200]`. Activity changes average the old and new base rates.
///
/// One instance per stream; instances are never shared between tasks.
#[derive(Debug, Clone)]
pub struct HeartRateGenerator<R> {
    activity: ActivityLevel,
    elapsed_ticks: u64,
    base_rate: i32,
    inject_anomalies: bool,
    table: ActivityRangeTable,
    rng: R,
}

impl<R: RandomSource> HeartRateGenerator<R> {
    /// Create a generator using the standard activity ranges
    #[must_use]
    pub fn new(activity: ActivityLevel, inject_anomalies: bool, rng: R) -> Self {
        Self::with_table(activity, inject_anomalies, ActivityRangeTable::standard(), rng)
    }

    /// Resting subject with anomaly injection enabled
    #[must_use]
    pub fn resting(rng: R) -> Self {
        Self::new(ActivityLevel::Resting, true, rng)
    }

    /// Create a generator with a custom activity table
    #[must_use]
    pub fn with_table(
        activity: ActivityLevel,
        inject_anomalies: bool,
        table: ActivityRangeTable,
        mut rng: R,
    ) -> Self {
        let base_rate = table.sample_base_rate(activity, &mut rng);
        Self {
            activity,
            elapsed_ticks: 0,
            base_rate,
            inject_anomalies,
            table,
            rng,
        }
    }

    /// Switch activity, smoothing the base rate toward the new range
    pub fn transition_activity(&mut self, activity: ActivityLevel) {
        let sampled = self.table.sample_base_rate(activity, &mut self.rng);
        self.activity = activity;
        self.base_rate = (self.base_rate + sampled) / 2;
    }

    /// Produce the next bpm value
    pub fn next_value(&mut self) -> i32 {
        self.next_beat().bpm
    }

    /// Produce the next value along with the injected perturbation, if any
    pub fn next_beat(&mut self) -> GeneratedBeat {
        self.elapsed_ticks += 1;

        let wave = WAVE_AMPLITUDE * (self.elapsed_ticks as f64 / WAVE_TICK_DIVISOR).sin();
        let noise = self.rng.uniform_f64(-NOISE_BOUND, NOISE_BOUND);
        let mut bpm = (f64::from(self.base_rate) + wave + noise) as i32;

        let injected = if self.inject_anomalies && self.rng.chance(INJECTION_PROBABILITY) {
            if self.rng.coin_flip() {
                bpm += self.rng.uniform_int(TACHYCARDIA_SPIKE.0, TACHYCARDIA_SPIKE.1);
                Some(InjectedArrhythmia::Tachycardia)
            } else {
                bpm -= self.rng.uniform_int(BRADYCARDIA_DROP.0, BRADYCARDIA_DROP.1);
                Some(InjectedArrhythmia::Bradycardia)
            }
        } else {
            None
        };

        GeneratedBeat {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            injected,
        }
    }

    /// Current activity
    #[must_use]
    pub const fn activity(&self) -> ActivityLevel {
        self.activity
    }

    /// Current smoothed base rate
    #[must_use]
    pub const fn base_rate(&self) -> i32 {
        self.base_rate
    }

    /// Ticks produced so far
    #[must_use]
    pub const fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Whether arrhythmias are injected
    #[must_use]
    pub const fn injects_anomalies(&self) -> bool {
        self.inject_anomalies
    }

    /// Activity table in use
    #[must_use]
    pub const fn table(&self) -> &ActivityRangeTable {
        &self.table
    }
}
