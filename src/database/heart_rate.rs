// ABOUTME: Database operations for raw heart-rate readings
// ABOUTME: Insert single readings or transactional batches, list newest first, count per user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{format_timestamp, parse_timestamp};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use chrono::{DateTime, Utc};
use pulse_core::models::{ActivityLevel, BpmSample, HeartRateReading};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::time::Instant;

/// A persisted heart-rate reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReading {
    /// Row identifier
    pub id: i64,
    /// Owner of the reading
    pub user_id: String,
    /// Beats per minute
    pub bpm: i32,
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
    /// Producing activity, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityLevel>,
}

impl BpmSample for StoredReading {
    fn bpm(&self) -> i32 {
        self.bpm
    }
}

impl From<StoredReading> for HeartRateReading {
    fn from(stored: StoredReading) -> Self {
        Self {
            bpm: stored.bpm,
            timestamp: stored.timestamp,
            activity: stored.activity,
        }
    }
}

/// Heart-rate reading manager
pub struct HeartRateManager {
    pool: SqlitePool,
}

impl HeartRateManager {
    /// Create a new heart-rate manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store one reading
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn record_reading(
        &self,
        user_id: &str,
        reading: &HeartRateReading,
    ) -> AppResult<StoredReading> {
        let result = sqlx::query(
            r"
            INSERT INTO heart_rate_readings (user_id, bpm, timestamp, activity, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(user_id)
        .bind(reading.bpm)
        .bind(format_timestamp(&reading.timestamp))
        .bind(reading.activity.as_ref().map(ActivityLevel::as_str))
        .bind(format_timestamp(&Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record heart-rate reading: {e}")))?;

        Ok(StoredReading {
            id: result.last_insert_rowid(),
            user_id: user_id.to_owned(),
            bpm: reading.bpm,
            timestamp: reading.timestamp,
            activity: reading.activity,
        })
    }

    /// Store a batch of readings in one transaction
    ///
    /// Either every reading is stored or none are.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be opened, any insert fails,
    /// or the commit fails
    pub async fn record_readings(
        &self,
        user_id: &str,
        readings: &[HeartRateReading],
    ) -> AppResult<u64> {
        let started = Instant::now();
        let created_at = format_timestamp(&Utc::now());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        for reading in readings {
            sqlx::query(
                r"
                INSERT INTO heart_rate_readings (user_id, bpm, timestamp, activity, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(user_id)
            .bind(reading.bpm)
            .bind(format_timestamp(&reading.timestamp))
            .bind(reading.activity.as_ref().map(ActivityLevel::as_str))
            .bind(&created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to record heart-rate batch: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit heart-rate batch: {e}")))?;

        AppLogger::log_database_operation(
            "insert_batch",
            "heart_rate_readings",
            true,
            started.elapsed().as_millis() as u64,
        );
        Ok(readings.len() as u64)
    }

    /// Most recent readings for a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row holds a malformed timestamp
    pub async fn recent_readings(
        &self,
        user_id: &str,
        limit: u32,
    ) -> AppResult<Vec<StoredReading>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, bpm, timestamp, activity
            FROM heart_rate_readings
            WHERE user_id = $1
            ORDER BY timestamp DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list heart-rate readings: {e}")))?;

        rows.iter().map(row_to_reading).collect()
    }

    /// Number of stored readings for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_readings(&self, user_id: &str) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM heart_rate_readings WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to count heart-rate readings: {e}"))
                })?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Remove every reading for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_readings(&self, user_id: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM heart_rate_readings WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete heart-rate readings: {e}")))?;

        Ok(result.rows_affected())
    }
}

fn row_to_reading(row: &SqliteRow) -> AppResult<StoredReading> {
    let timestamp_str: String = row.get("timestamp");
    let activity: Option<String> = row.get("activity");

    Ok(StoredReading {
        id: row.get("id"),
        user_id: row.get("user_id"),
        bpm: row.get("bpm"),
        timestamp: parse_timestamp(&timestamp_str)?,
        activity: activity.as_deref().map(ActivityLevel::parse),
    })
}
