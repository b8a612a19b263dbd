// ABOUTME: Explicit activity-to-base-rate configuration table
// ABOUTME: Maps each activity level to an inclusive bpm range with a fixed fallback rate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::random::RandomSource;
use pulse_core::constants::heart_rate::FALLBACK_BASE_RATE;
use pulse_core::models::ActivityLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inclusive range of resting points for one activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRateRange {
    /// Lowest base rate
    pub min: i32,
    /// Highest base rate
    pub max: i32,
}

impl BaseRateRange {
    /// Create a range; bounds are swapped if given in reverse
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Whether `bpm` lies inside the range
    #[must_use]
    pub const fn contains(&self, bpm: i32) -> bool {
        bpm >= self.min && bpm <= self.max
    }
}

/// Base-rate ranges keyed by activity
///
/// Lookups for an activity without an entry (always the case for
/// [`ActivityLevel::Unknown`]) return the fixed fallback rate instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRangeTable {
    ranges: HashMap<ActivityLevel, BaseRateRange>,
    fallback_base_rate: i32,
}

impl ActivityRangeTable {
    /// Table with no ranges; every activity resolves to `fallback_base_rate`
    #[must_use]
    pub fn empty(fallback_base_rate: i32) -> Self {
        Self {
            ranges: HashMap::new(),
            fallback_base_rate,
        }
    }

    /// The standard physiological ranges
    #[must_use]
    pub fn standard() -> Self {
        Self::empty(FALLBACK_BASE_RATE)
            .with_range(ActivityLevel::Resting, BaseRateRange::new(60, 75))
            .with_range(ActivityLevel::Walking, BaseRateRange::new(90, 110))
            .with_range(ActivityLevel::Jogging, BaseRateRange::new(130, 150))
            .with_range(ActivityLevel::Running, BaseRateRange::new(150, 170))
            .with_range(ActivityLevel::Cooldown, BaseRateRange::new(100, 120))
    }

    /// Add or replace the range for one activity
    #[must_use]
    pub fn with_range(mut self, activity: ActivityLevel, range: BaseRateRange) -> Self {
        self.ranges.insert(activity, range);
        self
    }

    /// Configured range, if any
    #[must_use]
    pub fn range_for(&self, activity: ActivityLevel) -> Option<BaseRateRange> {
        self.ranges.get(&activity).copied()
    }

    /// Rate used for activities without a range
    #[must_use]
    pub const fn fallback_base_rate(&self) -> i32 {
        self.fallback_base_rate
    }

    /// Draw a base rate for `activity`
    pub fn sample_base_rate<R: RandomSource + ?Sized>(
        &self,
        activity: ActivityLevel,
        rng: &mut R,
    ) -> i32 {
        self.range_for(activity).map_or(self.fallback_base_rate, |range| {
            rng.uniform_int(range.min, range.max)
        })
    }
}

impl Default for ActivityRangeTable {
    fn default() -> Self {
        Self::standard()
    }
}
