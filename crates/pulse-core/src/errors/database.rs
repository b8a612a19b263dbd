// ABOUTME: Structured error types for database operations
// ABOUTME: Provides domain-specific errors with context and conversion into AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};
use thiserror::Error;

/// Errors raised by the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Could not open or reach the database
    #[error("Database connection failed: {context}")]
    ConnectionError {
        /// What was being attempted
        context: String,
    },

    /// A query failed or returned malformed data
    #[error("Query failed: {context}")]
    QueryError {
        /// What was being attempted
        context: String,
    },

    /// Schema creation failed
    #[error("Migration failed: {context}")]
    MigrationError {
        /// Which migration step failed
        context: String,
    },

    /// Raw driver error
    #[cfg(feature = "database-errors")]
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        Self::new(ErrorCode::DatabaseError, error.to_string()).with_source(error)
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::Sqlx(error).into()
    }
}
