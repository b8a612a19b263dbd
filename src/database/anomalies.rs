// ABOUTME: Database operations for detected anomalies
// ABOUTME: Insert, list newest first, and existence checks used for de-duplication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{format_timestamp, parse_timestamp};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use pulse_core::models::Severity;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

/// Anomaly about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnomaly {
    /// Owner of the anomaly
    pub user_id: String,
    /// Anomaly category, e.g. `heart_rate`
    pub anomaly_type: String,
    /// Human-readable description
    pub message: String,
    /// Severity tier
    pub severity: Severity,
    /// When the anomaly was recorded
    pub timestamp: DateTime<Utc>,
    /// Offending bpm value
    pub bpm: Option<i32>,
    /// Rounded z-score of the offending reading
    pub z_score: Option<f64>,
    /// Timestamp of the offending reading
    pub reading_timestamp: Option<DateTime<Utc>>,
    /// Unique per user and type when set; an insert reusing a key is skipped
    pub dedup_key: Option<String>,
}

/// A persisted anomaly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnomaly {
    /// Row identifier
    pub id: i64,
    /// Owner of the anomaly
    pub user_id: String,
    /// Anomaly category
    #[serde(rename = "type")]
    pub anomaly_type: String,
    /// Human-readable description
    pub message: String,
    /// Severity tier
    pub severity: Severity,
    /// When the anomaly was recorded
    pub timestamp: DateTime<Utc>,
    /// Offending bpm value
    pub bpm: Option<i32>,
    /// Rounded z-score
    pub z_score: Option<f64>,
    /// Timestamp of the offending reading
    pub reading_timestamp: Option<DateTime<Utc>>,
}

/// Stored anomaly manager
pub struct AnomalyManager {
    pool: SqlitePool,
}

impl AnomalyManager {
    /// Create a new anomaly manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store an anomaly
    ///
    /// Returns `None` when a row with the same user, type, and `dedup_key`
    /// already exists. The check and the insert are one statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn insert(&self, anomaly: &NewAnomaly) -> AppResult<Option<StoredAnomaly>> {
        let result = sqlx::query(
            r"
            INSERT INTO anomalies (
                user_id, type, message, severity, timestamp, bpm, z_score, reading_timestamp,
                dedup_key
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(&anomaly.user_id)
        .bind(&anomaly.anomaly_type)
        .bind(&anomaly.message)
        .bind(anomaly.severity.as_str())
        .bind(format_timestamp(&anomaly.timestamp))
        .bind(anomaly.bpm)
        .bind(anomaly.z_score)
        .bind(anomaly.reading_timestamp.as_ref().map(format_timestamp))
        .bind(anomaly.dedup_key.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store anomaly: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(StoredAnomaly {
            id: result.last_insert_rowid(),
            user_id: anomaly.user_id.clone(),
            anomaly_type: anomaly.anomaly_type.clone(),
            message: anomaly.message.clone(),
            severity: anomaly.severity,
            timestamp: anomaly.timestamp,
            bpm: anomaly.bpm,
            z_score: anomaly.z_score,
            reading_timestamp: anomaly.reading_timestamp,
        }))
    }

    /// Stored anomalies for a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_for_user(&self, user_id: &str, limit: u32) -> AppResult<Vec<StoredAnomaly>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, type, message, severity, timestamp, bpm, z_score, reading_timestamp
            FROM anomalies
            WHERE user_id = $1
            ORDER BY timestamp DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list anomalies: {e}")))?;

        rows.iter().map(row_to_anomaly).collect()
    }

    /// Whether any anomaly of `anomaly_type` exists for the user
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn exists_of_type(&self, user_id: &str, anomaly_type: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM anomalies WHERE user_id = $1 AND type = $2 LIMIT 1",
        )
        .bind(user_id)
        .bind(anomaly_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check anomalies: {e}")))?;

        Ok(count > 0)
    }

    /// Whether an anomaly of `anomaly_type` was already stored for this exact reading
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn exists_for_reading(
        &self,
        user_id: &str,
        anomaly_type: &str,
        reading_timestamp: &DateTime<Utc>,
    ) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM anomalies
            WHERE user_id = $1 AND type = $2 AND reading_timestamp = $3
            ",
        )
        .bind(user_id)
        .bind(anomaly_type)
        .bind(format_timestamp(reading_timestamp))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check anomalies: {e}")))?;

        Ok(count > 0)
    }

    /// Remove every anomaly for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_for_user(&self, user_id: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM anomalies WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete anomalies: {e}")))?;

        Ok(result.rows_affected())
    }
}

fn row_to_anomaly(row: &SqliteRow) -> AppResult<StoredAnomaly> {
    let severity_str: String = row.get("severity");
    let timestamp_str: String = row.get("timestamp");
    let reading_timestamp_str: Option<String> = row.get("reading_timestamp");

    Ok(StoredAnomaly {
        id: row.get("id"),
        user_id: row.get("user_id"),
        anomaly_type: row.get("type"),
        message: row.get("message"),
        severity: Severity::parse(&severity_str),
        timestamp: parse_timestamp(&timestamp_str)?,
        bpm: row.get("bpm"),
        z_score: row.get("z_score"),
        reading_timestamp: reading_timestamp_str
            .as_deref()
            .map(parse_timestamp)
            .transpose()?,
    })
}
