// ABOUTME: SQLite database connection, schema migrations, and manager accessors
// ABOUTME: Owns the sqlx pool shared by the heart-rate and anomaly managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Stores raw heart-rate readings and detected anomalies per user. Timestamps
//! are persisted as fixed-width RFC 3339 strings (microsecond precision, `Z`
//! suffix) so lexical order in SQL equals chronological order.

mod anomalies;
mod heart_rate;
mod repository;

pub use anomalies::{AnomalyManager, NewAnomaly, StoredAnomaly};
pub use heart_rate::{HeartRateManager, StoredReading};
pub use repository::{HeartRateRepository, SqliteHeartRateRepository};

use crate::errors::{AppError, AppResult, DatabaseError};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Database handle for heart-rate storage
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to `database_url` and run migrations
    ///
    /// File databases are created when missing, including their parent
    /// directory. In-memory databases use a single long-lived connection so
    /// every query sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");
        if !in_memory {
            ensure_parent_dir(database_url)?;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| DatabaseError::ConnectionError {
                context: format!("Invalid database URL '{database_url}': {e}"),
            })?
            .create_if_missing(true);

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionError {
                context: format!("Failed to connect to {database_url}: {e}"),
            })?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database_url, "Database initialized");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Heart-rate reading operations
    #[must_use]
    pub fn heart_rate(&self) -> HeartRateManager {
        HeartRateManager::new(self.pool.clone())
    }

    /// Stored anomaly operations
    #[must_use]
    pub fn anomalies(&self) -> AnomalyManager {
        AnomalyManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index cannot be created
    pub async fn migrate(&self) -> AppResult<()> {
        self.create_heart_rate_readings_table().await?;
        self.create_anomalies_table().await?;
        self.create_indexes().await?;
        debug!("Heart-rate schema migrated");
        Ok(())
    }

    /// Create `heart_rate_readings` table
    async fn create_heart_rate_readings_table(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS heart_rate_readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                bpm INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                activity TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| migration_error("heart_rate_readings", &e))?;
        Ok(())
    }

    /// Create `anomalies` table
    async fn create_anomalies_table(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS anomalies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                type TEXT NOT NULL,
                message TEXT NOT NULL,
                severity TEXT NOT NULL DEFAULT 'medium',
                timestamp TEXT NOT NULL,
                bpm INTEGER,
                z_score REAL,
                reading_timestamp TEXT,
                dedup_key TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| migration_error("anomalies", &e))?;
        self.add_anomalies_dedup_key_column().await
    }

    /// Add `anomalies.dedup_key` to databases created before it existed
    async fn add_anomalies_dedup_key_column(&self) -> AppResult<()> {
        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('anomalies')")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| migration_error("anomalies.dedup_key", &e))?;

        if !columns.iter().any(|name| name == "dedup_key") {
            sqlx::query("ALTER TABLE anomalies ADD COLUMN dedup_key TEXT")
                .execute(&self.pool)
                .await
                .map_err(|e| migration_error("anomalies.dedup_key", &e))?;
        }
        Ok(())
    }

    async fn create_indexes(&self) -> AppResult<()> {
        for statement in [
            r"
            CREATE INDEX IF NOT EXISTS idx_heart_rate_user_time
            ON heart_rate_readings(user_id, timestamp DESC)
            ",
            r"
            CREATE INDEX IF NOT EXISTS idx_anomalies_user_type
            ON anomalies(user_id, type, reading_timestamp)
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_anomalies_dedup
            ON anomalies(user_id, type, dedup_key)
            WHERE dedup_key IS NOT NULL
            ",
        ] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| migration_error("indexes", &e))?;
        }
        Ok(())
    }
}

fn migration_error(step: &str, error: &sqlx::Error) -> AppError {
    DatabaseError::MigrationError {
        context: format!("{step}: {error}"),
    }
    .into()
}

fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let path_str = database_url
        .strip_prefix("sqlite:")
        .unwrap_or(database_url)
        .split('?')
        .next()
        .unwrap_or_default();
    let path_str = path_str.strip_prefix("//").unwrap_or(path_str);

    if let Some(parent) = Path::new(path_str).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::database(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }
    Ok(())
}

/// Fixed-width storage representation of a timestamp
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
///
/// # Errors
///
/// Returns an error if the column does not hold RFC 3339 text
pub fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid datetime '{raw}': {e}")))
}
