// ABOUTME: Repository trait for heart-rate persistence used by the anomaly scan service
// ABOUTME: SQLite implementation delegates to the reading and anomaly managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{Database, NewAnomaly, StoredAnomaly, StoredReading};
use crate::errors::DatabaseError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage operations the anomaly scan needs
#[async_trait]
pub trait HeartRateRepository: Send + Sync {
    /// Most recent readings for a user, newest first
    async fn recent_readings(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<StoredReading>, DatabaseError>;

    /// Persist a detected anomaly, `None` if its dedup key is already taken
    async fn store_anomaly(
        &self,
        anomaly: &NewAnomaly,
    ) -> Result<Option<StoredAnomaly>, DatabaseError>;

    /// Whether any anomaly of this type exists for the user
    async fn anomaly_exists_of_type(
        &self,
        user_id: &str,
        anomaly_type: &str,
    ) -> Result<bool, DatabaseError>;

    /// Whether this exact reading was already flagged
    async fn anomaly_exists_for_reading(
        &self,
        user_id: &str,
        anomaly_type: &str,
        reading_timestamp: &DateTime<Utc>,
    ) -> Result<bool, DatabaseError>;
}

/// `SQLite` implementation of `HeartRateRepository`
pub struct SqliteHeartRateRepository {
    db: Database,
}

impl SqliteHeartRateRepository {
    /// Create a new repository with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HeartRateRepository for SqliteHeartRateRepository {
    async fn recent_readings(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<StoredReading>, DatabaseError> {
        self.db
            .heart_rate()
            .recent_readings(user_id, limit)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: e.to_string(),
            })
    }

    async fn store_anomaly(
        &self,
        anomaly: &NewAnomaly,
    ) -> Result<Option<StoredAnomaly>, DatabaseError> {
        self.db
            .anomalies()
            .insert(anomaly)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: e.to_string(),
            })
    }

    async fn anomaly_exists_of_type(
        &self,
        user_id: &str,
        anomaly_type: &str,
    ) -> Result<bool, DatabaseError> {
        self.db
            .anomalies()
            .exists_of_type(user_id, anomaly_type)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: e.to_string(),
            })
    }

    async fn anomaly_exists_for_reading(
        &self,
        user_id: &str,
        anomaly_type: &str,
        reading_timestamp: &DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        self.db
            .anomalies()
            .exists_for_reading(user_id, anomaly_type, reading_timestamp)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: e.to_string(),
            })
    }
}
