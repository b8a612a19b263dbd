// ABOUTME: Heart-rate reading and anomaly severity models
// ABOUTME: Defines the minimal {bpm, timestamp} reading shape consumed by the detector
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ActivityLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything that exposes a beats-per-minute value
///
/// The detector is generic over this so stored rows, simulated readings, and
/// caller-defined records can all be scanned without conversion.
pub trait BpmSample {
    /// Beats per minute of this sample
    fn bpm(&self) -> i32;
}

/// A single heart-rate measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateReading {
    /// Beats per minute
    pub bpm: i32,
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
    /// Activity that produced the reading, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityLevel>,
}

impl HeartRateReading {
    /// Create a reading without an activity label
    #[must_use]
    pub const fn new(bpm: i32, timestamp: DateTime<Utc>) -> Self {
        Self {
            bpm,
            timestamp,
            activity: None,
        }
    }

    /// Attach the producing activity
    #[must_use]
    pub const fn with_activity(mut self, activity: ActivityLevel) -> Self {
        self.activity = Some(activity);
        self
    }
}

impl BpmSample for HeartRateReading {
    fn bpm(&self) -> i32 {
        self.bpm
    }
}

/// Severity tier of a detected anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 2.5 < |z| <= 3.0
    Medium,
    /// |z| > 3.0
    High,
}

impl Severity {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "high" => Self::High,
            // Stored rows default to medium, matching the column default
            _ => Self::Medium,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
