// ABOUTME: Anomaly scan service combining stored readings, the z-score detector, and persistence
// ABOUTME: Falls back to a simulated session when a user has too little history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Anomaly scan for one user
//!
//! 1. Load the most recent readings (bounded by the scan limit).
//! 2. If too few are stored, generate a simulated session instead.
//! 3. Run the detector on the batch in chronological order.
//! 4. Store each detection subject to the configured de-duplication policy.

use crate::config::{AnomalyDedupPolicy, HeartRateConfig};
use crate::database::{format_timestamp, HeartRateRepository, NewAnomaly};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use super::simulation::{session_start_ending_now, simulate_session};
use chrono::Utc;
use pulse_core::constants::anomaly::HEART_RATE_ANOMALY_TYPE;
use pulse_core::constants::defaults::SIMULATION_FALLBACK_TICKS;
use pulse_core::models::HeartRateReading;
use pulse_intelligence::{detect_anomalies, AnomalyRecord, RandomSource, RngSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task;
use tracing::debug;

const ONCE_PER_TYPE_DEDUP_KEY: &str = "once_per_type";

/// Tuning for a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnomalyScanSettings {
    /// Most recent readings considered
    pub scan_limit: u32,
    /// Below this many stored readings the scan runs on simulated data
    pub simulation_fallback_min: u32,
    /// Length of the simulated fallback session
    pub fallback_ticks: u32,
    /// Inject arrhythmias into the simulated session
    pub inject_anomalies: bool,
    /// Duplicate handling for stored anomalies
    pub dedup_policy: AnomalyDedupPolicy,
}

impl From<&HeartRateConfig> for AnomalyScanSettings {
    fn from(config: &HeartRateConfig) -> Self {
        Self {
            scan_limit: config.anomaly_scan_limit,
            simulation_fallback_min: config.simulation_fallback_min,
            fallback_ticks: SIMULATION_FALLBACK_TICKS,
            inject_anomalies: config.inject_anomalies,
            dedup_policy: config.dedup_policy,
        }
    }
}

impl Default for AnomalyScanSettings {
    fn default() -> Self {
        Self::from(&HeartRateConfig::default())
    }
}

/// Outcome of a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyScanResult {
    /// Size of the scanned batch
    pub total_readings: usize,
    /// Number of readings flagged
    pub anomalies_detected: usize,
    /// Number of detections persisted after de-duplication
    pub anomalies_stored: usize,
    /// Whether the batch was simulated rather than loaded
    pub simulated: bool,
    /// Flagged readings in chronological order
    pub anomalies: Vec<AnomalyRecord<HeartRateReading>>,
}

/// Runs anomaly scans against a heart-rate repository
pub struct AnomalyScanService {
    repository: Arc<dyn HeartRateRepository>,
    settings: AnomalyScanSettings,
}

impl AnomalyScanService {
    /// Create a scan service
    #[must_use]
    pub fn new(repository: Arc<dyn HeartRateRepository>, settings: AnomalyScanSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Scan settings in effect
    #[must_use]
    pub const fn settings(&self) -> &AnomalyScanSettings {
        &self.settings
    }

    /// Scan a user's recent history, simulating one from entropy if needed
    ///
    /// # Errors
    ///
    /// Returns an error if loading readings or storing anomalies fails
    pub async fn scan_user(&self, user_id: &str) -> AppResult<AnomalyScanResult> {
        self.scan_user_with_rng(user_id, RngSource::from_entropy()).await
    }

    /// Scan a user's recent history, simulating with `rng` if needed
    ///
    /// # Errors
    ///
    /// Returns an error if loading readings or storing anomalies fails
    pub async fn scan_user_with_rng<R>(&self, user_id: &str, rng: R) -> AppResult<AnomalyScanResult>
    where
        R: RandomSource + Send + 'static,
    {
        let (batch, simulated) = self.load_batch(user_id, rng).await?;
        let total_readings = batch.len();

        let anomalies = task::spawn_blocking(move || detect_anomalies(&batch))
            .await
            .map_err(|e| AppError::internal(format!("Anomaly detection task failed: {e}")))?;

        let anomalies_stored = self.persist(user_id, &anomalies).await?;

        AppLogger::log_anomaly_scan(
            user_id,
            total_readings,
            anomalies.len(),
            anomalies_stored,
            simulated,
        );

        Ok(AnomalyScanResult {
            total_readings,
            anomalies_detected: anomalies.len(),
            anomalies_stored,
            simulated,
            anomalies,
        })
    }

    async fn load_batch<R>(&self, user_id: &str, rng: R) -> AppResult<(Vec<HeartRateReading>, bool)>
    where
        R: RandomSource + Send + 'static,
    {
        let stored = self
            .repository
            .recent_readings(user_id, self.settings.scan_limit)
            .await?;

        if stored.len() >= self.settings.simulation_fallback_min as usize {
            // Stored newest first; the detector reports in input order
            let batch = stored.into_iter().rev().map(HeartRateReading::from).collect();
            return Ok((batch, false));
        }

        debug!(
            user_id,
            stored = stored.len(),
            "Too little history for a scan, simulating a session"
        );
        let ticks = self.settings.fallback_ticks;
        let inject = self.settings.inject_anomalies;
        let batch = task::spawn_blocking(move || {
            simulate_session(ticks, inject, rng, session_start_ending_now(ticks))
        })
        .await
        .map_err(|e| AppError::internal(format!("Simulation task failed: {e}")))?;
        Ok((batch, true))
    }

    async fn persist(
        &self,
        user_id: &str,
        anomalies: &[AnomalyRecord<HeartRateReading>],
    ) -> AppResult<usize> {
        let mut stored = 0;
        for record in anomalies {
            if self.is_duplicate(user_id, record).await? {
                continue;
            }
            let inserted = self
                .repository
                .store_anomaly(&NewAnomaly {
                    user_id: user_id.to_owned(),
                    anomaly_type: HEART_RATE_ANOMALY_TYPE.to_owned(),
                    message: anomaly_message(record),
                    severity: record.severity,
                    timestamp: Utc::now(),
                    bpm: Some(record.reading.bpm),
                    z_score: Some(record.z_score),
                    reading_timestamp: Some(record.reading.timestamp),
                    dedup_key: self.dedup_key(record),
                })
                .await?;
            if inserted.is_some() {
                stored += 1;
            }
        }
        Ok(stored)
    }

    /// Key enforced by the unique index on `anomalies`
    fn dedup_key(&self, record: &AnomalyRecord<HeartRateReading>) -> Option<String> {
        match self.settings.dedup_policy {
            AnomalyDedupPolicy::Disabled => None,
            AnomalyDedupPolicy::OncePerType => Some(ONCE_PER_TYPE_DEDUP_KEY.to_owned()),
            AnomalyDedupPolicy::PerReading => Some(format_timestamp(&record.reading.timestamp)),
        }
    }

    async fn is_duplicate(
        &self,
        user_id: &str,
        record: &AnomalyRecord<HeartRateReading>,
    ) -> AppResult<bool> {
        let duplicate = match self.settings.dedup_policy {
            AnomalyDedupPolicy::Disabled => false,
            AnomalyDedupPolicy::OncePerType => {
                self.repository
                    .anomaly_exists_of_type(user_id, HEART_RATE_ANOMALY_TYPE)
                    .await?
            }
            AnomalyDedupPolicy::PerReading => {
                self.repository
                    .anomaly_exists_for_reading(
                        user_id,
                        HEART_RATE_ANOMALY_TYPE,
                        &record.reading.timestamp,
                    )
                    .await?
            }
        };
        Ok(duplicate)
    }
}

/// Human-readable description stored with each anomaly
#[must_use]
pub fn anomaly_message(record: &AnomalyRecord<HeartRateReading>) -> String {
    format!(
        "Anomalous heart rate detected: {} BPM (z-score: {})",
        record.reading.bpm, record.z_score
    )
}
