// ABOUTME: Batch z-score anomaly detection over heart-rate readings
// ABOUTME: Flags readings more than 2.5 standard deviations from the batch mean
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pulse_core::constants::anomaly::{HIGH_SEVERITY_Z_SCORE, MIN_SAMPLE_SIZE, Z_SCORE_THRESHOLD};
use pulse_core::models::{BpmSample, Severity};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Summary statistics for one batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    /// Number of samples
    pub count: usize,
    /// Arithmetic mean bpm
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl BatchStatistics {
    /// Compute statistics; `None` for an empty batch
    #[must_use]
    pub fn from_samples<T: BpmSample>(samples: &[T]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let count = samples.len();
        let n = count as f64;
        let mean = samples.iter().map(|s| f64::from(s.bpm())).sum::<f64>() / n;
        let variance = samples
            .iter()
            .map(|s| {
                let diff = f64::from(s.bpm()) - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;

        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
        })
    }

    /// Z-score of `bpm` against this batch; zero when the batch has no spread
    #[must_use]
    pub fn z_score(&self, bpm: i32) -> f64 {
        if self.std_dev > 0.0 {
            (f64::from(bpm) - self.mean) / self.std_dev
        } else {
            0.0
        }
    }
}

/// A reading flagged as an outlier
///
/// Serializes as the original reading's fields plus `z_score` and `severity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord<T> {
    /// The flagged reading, unchanged
    #[serde(flatten)]
    pub reading: T,
    /// Z-score rounded to two decimals
    pub z_score: f64,
    /// Severity tier
    pub severity: Severity,
}

/// Severity for an unrounded z-score, `None` when it is not an outlier
#[must_use]
pub fn classify_z_score(z_score: f64) -> Option<Severity> {
    let magnitude = z_score.abs();
    if magnitude > HIGH_SEVERITY_Z_SCORE {
        Some(Severity::High)
    } else if magnitude > Z_SCORE_THRESHOLD {
        Some(Severity::Medium)
    } else {
        None
    }
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Flag readings whose z-score magnitude exceeds 2.5
///
/// Batches with fewer than 50 readings are too small to judge and yield no
/// anomalies. The threshold and severity use the unrounded z-score; the
/// reported value is rounded to two decimals. Output keeps input order.
#[must_use]
pub fn detect_anomalies<T: BpmSample + Clone>(readings: &[T]) -> Vec<AnomalyRecord<T>> {
    if readings.len() < MIN_SAMPLE_SIZE {
        return Vec::new();
    }
    let Some(stats) = BatchStatistics::from_samples(readings) else {
        return Vec::new();
    };

    let anomalies: Vec<AnomalyRecord<T>> = readings
        .iter()
        .filter_map(|reading| {
            let z = stats.z_score(reading.bpm());
            classify_z_score(z).map(|severity| AnomalyRecord {
                reading: reading.clone(),
                z_score: round_two_decimals(z),
                severity,
            })
        })
        .collect();

    debug!(
        count = stats.count,
        mean = stats.mean,
        std_dev = stats.std_dev,
        flagged = anomalies.len(),
        "Heart-rate batch scanned"
    );
    anomalies
}
