// ABOUTME: Simulated heart-rate sessions built from the standard activity plan
// ABOUTME: Shared by the simulate endpoint, the backfill endpoint, the anomaly fallback, and the seeder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Duration, Utc};
use pulse_core::models::{ActivityLevel, HeartRateReading};
use pulse_intelligence::{generate_history, HeartRateGenerator, PhasePlan, RandomSource, RngSource};

/// Standard session rescaled to `ticks` one-second readings starting at `start`
pub fn simulate_session<R: RandomSource>(
    ticks: u32,
    inject_anomalies: bool,
    rng: R,
    start: DateTime<Utc>,
) -> Vec<HeartRateReading> {
    let plan = PhasePlan::standard_session().scaled_to(ticks);
    let mut generator = HeartRateGenerator::new(ActivityLevel::Resting, inject_anomalies, rng);
    generate_history(&mut generator, &plan, start, Duration::seconds(1))
}

/// Like [`simulate_session`], reproducible when `seed` is given
#[must_use]
pub fn simulate_with_seed(
    ticks: u32,
    inject_anomalies: bool,
    seed: Option<u64>,
    start: DateTime<Utc>,
) -> Vec<HeartRateReading> {
    match seed {
        Some(seed) => simulate_session(ticks, inject_anomalies, RngSource::seeded(seed), start),
        None => simulate_session(ticks, inject_anomalies, RngSource::from_entropy(), start),
    }
}

/// Start time for a session of `ticks` seconds that ends now
#[must_use]
pub fn session_start_ending_now(ticks: u32) -> DateTime<Utc> {
    Utc::now() - Duration::seconds(i64::from(ticks))
}
