// ABOUTME: Activity phase plans and bulk heart-rate history generation
// ABOUTME: Drives a generator through timed phases to backfill or simulate a session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::generator::HeartRateGenerator;
use crate::random::RandomSource;
use chrono::{DateTime, Duration, Utc};
use pulse_core::models::{ActivityLevel, HeartRateReading};
use serde::{Deserialize, Serialize};

/// One timed segment of a simulated session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPhase {
    /// Activity for the segment
    pub activity: ActivityLevel,
    /// Number of generator ticks in the segment
    pub duration_ticks: u32,
}

impl ActivityPhase {
    /// Create a phase
    #[must_use]
    pub const fn new(activity: ActivityLevel, duration_ticks: u32) -> Self {
        Self {
            activity,
            duration_ticks,
        }
    }
}

/// Ordered list of activity phases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlan {
    phases: Vec<ActivityPhase>,
}

impl PhasePlan {
    /// Plan from explicit phases
    #[must_use]
    pub const fn new(phases: Vec<ActivityPhase>) -> Self {
        Self { phases }
    }

    /// One-hour workout: rest, walk, jog, cool down, rest
    #[must_use]
    pub fn standard_session() -> Self {
        Self::new(vec![
            ActivityPhase::new(ActivityLevel::Resting, 600),
            ActivityPhase::new(ActivityLevel::Walking, 900),
            ActivityPhase::new(ActivityLevel::Jogging, 1200),
            ActivityPhase::new(ActivityLevel::Cooldown, 600),
            ActivityPhase::new(ActivityLevel::Resting, 300),
        ])
    }

    /// Phases in order
    #[must_use]
    pub fn phases(&self) -> &[ActivityPhase] {
        &self.phases
    }

    /// Sum of all phase durations
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.phases.iter().map(|p| u64::from(p.duration_ticks)).sum()
    }

    /// Whether the plan produces no readings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_ticks() == 0
    }

    /// Rescale phase durations so they sum to `total_ticks`
    ///
    /// Durations stay proportional to the original plan. Every phase keeps at
    /// least one tick and the final phase absorbs rounding. When `total_ticks`
    /// is smaller than the number of phases, only the leading phases survive
    /// with one tick each.
    #[must_use]
    pub fn scaled_to(&self, total_ticks: u32) -> Self {
        let current = self.total_ticks();
        if current == 0 || total_ticks == 0 {
            return Self::default();
        }
        if u64::from(total_ticks) == current {
            return self.clone();
        }

        let target = total_ticks as usize;
        if target <= self.phases.len() {
            return Self::new(
                self.phases
                    .iter()
                    .take(target)
                    .map(|p| ActivityPhase::new(p.activity, 1))
                    .collect(),
            );
        }

        let count = self.phases.len();
        let mut remaining = u64::from(total_ticks);
        let mut scaled = Vec::with_capacity(count);
        for (index, phase) in self.phases.iter().enumerate() {
            let still_to_fill = (count - index - 1) as u64;
            let ticks = if still_to_fill == 0 {
                remaining
            } else {
                let proportional =
                    u64::from(phase.duration_ticks) * u64::from(total_ticks) / current;
                proportional.max(1).min(remaining - still_to_fill)
            };
            remaining -= ticks;
            scaled.push(ActivityPhase::new(phase.activity, ticks as u32));
        }
        Self::new(scaled)
    }
}

/// Run `generator` through every phase of `plan`
///
/// Each phase starts with an activity transition, then emits one reading per
/// tick labelled with that activity. Timestamps start at `start` and advance by
/// `interval`.
pub fn generate_history<R: RandomSource>(
    generator: &mut HeartRateGenerator<R>,
    plan: &PhasePlan,
    start: DateTime<Utc>,
    interval: Duration,
) -> Vec<HeartRateReading> {
    let mut readings = Vec::with_capacity(plan.total_ticks() as usize);
    let mut timestamp = start;

    for phase in plan.phases() {
        generator.transition_activity(phase.activity);
        for _ in 0..phase.duration_ticks {
            readings.push(
                HeartRateReading::new(generator.next_value(), timestamp)
                    .with_activity(phase.activity),
            );
            timestamp += interval;
        }
    }

    readings
}
