// ABOUTME: Heart-rate REST route handlers for simulation, recording, history, and anomaly scans
// ABOUTME: Thin handlers that validate input and delegate to the database managers and services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Heart-rate routes
//!
//! Readings and anomalies are scoped by the `user_id` path segment.

use crate::{
    errors::{AppError, AppResult},
    logging::AppLogger,
    server::ServerResources,
    services::{session_start_ending_now, simulate_with_seed},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use pulse_core::constants::heart_rate::{MAX_RECORDABLE_BPM, MIN_RECORDABLE_BPM};
use pulse_core::models::{ActivityLevel, HeartRateReading};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task;

const DEFAULT_SESSION_SECONDS: u32 = 3600;

/// Body of a recorded reading
#[derive(Debug, Deserialize)]
pub struct RecordReadingRequest {
    /// Beats per minute
    pub bpm: i32,
    /// Activity at the time of the reading
    #[serde(default)]
    pub activity: Option<ActivityLevel>,
}

#[derive(Debug, Deserialize)]
struct SimulateQuery {
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct BackfillQuery {
    #[serde(default)]
    duration_seconds: Option<u32>,
    #[serde(default)]
    seed: Option<u64>,
}

/// Simulated session returned by the simulate endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationResponse {
    /// Number of generated readings
    pub total_readings: usize,
    /// Session length in seconds
    pub duration_seconds: u32,
    /// Generated readings in chronological order
    pub data: Vec<HeartRateReading>,
}

/// Summary of a persisted simulated session
#[derive(Debug, Serialize, Deserialize)]
pub struct BackfillResponse {
    /// Owner of the readings
    pub user_id: String,
    /// Number of readings written
    pub readings_stored: u64,
    /// Session length in seconds
    pub duration_seconds: u32,
}

/// Heart-rate routes
pub struct HeartRateRoutes;

impl HeartRateRoutes {
    /// Create all heart-rate routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/heart-rate/simulate/:duration_seconds",
                get(Self::handle_simulate),
            )
            .route(
                "/api/users/:user_id/heart-rate",
                post(Self::handle_record_reading),
            )
            .route(
                "/api/users/:user_id/heart-rate/history",
                get(Self::handle_history),
            )
            .route(
                "/api/users/:user_id/heart-rate/backfill",
                post(Self::handle_backfill),
            )
            .route(
                "/api/users/:user_id/heart-rate/anomalies",
                get(Self::handle_scan_anomalies),
            )
            .route(
                "/api/users/:user_id/anomalies",
                get(Self::handle_stored_anomalies),
            )
            .with_state(resources)
    }

    /// Generate a simulated session without storing it
    async fn handle_simulate(
        State(resources): State<Arc<ServerResources>>,
        Path(duration_seconds): Path<u32>,
        Query(params): Query<SimulateQuery>,
    ) -> Result<Response, AppError> {
        let max = resources.config.heart_rate.max_simulation_seconds;
        validate_duration(duration_seconds, max)?;

        let inject = resources.config.heart_rate.inject_anomalies;
        let start = Utc::now();
        let data = task::spawn_blocking(move || {
            simulate_with_seed(duration_seconds, inject, params.seed, start)
        })
        .await
        .map_err(|e| AppError::internal(format!("Simulation task failed: {e}")))?;

        let response = SimulationResponse {
            total_readings: data.len(),
            duration_seconds,
            data,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Store one reading timestamped now
    async fn handle_record_reading(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
        Json(request): Json<RecordReadingRequest>,
    ) -> Result<Response, AppError> {
        validate_user_id(&user_id)?;
        if !(MIN_RECORDABLE_BPM..=MAX_RECORDABLE_BPM).contains(&request.bpm) {
            let reason = format!(
                "bpm {} outside recordable range {MIN_RECORDABLE_BPM}..={MAX_RECORDABLE_BPM}",
                request.bpm
            );
            AppLogger::log_rejected_input(&user_id, &reason);
            return Err(AppError::out_of_range(reason).with_user_id(&user_id));
        }

        let mut reading = HeartRateReading::new(request.bpm, Utc::now());
        reading.activity = request.activity;

        let stored = resources
            .database
            .heart_rate()
            .record_reading(&user_id, &reading)
            .await?;

        Ok((StatusCode::CREATED, Json(stored)).into_response())
    }

    /// Most recent readings, newest first
    async fn handle_history(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
        Query(params): Query<HistoryQuery>,
    ) -> Result<Response, AppError> {
        validate_user_id(&user_id)?;
        let config = &resources.config.heart_rate;
        let limit = params.limit.unwrap_or(config.history_limit);
        if limit == 0 {
            return Err(AppError::invalid_input("limit must be at least 1"));
        }
        let limit = limit.min(config.anomaly_scan_limit);

        let readings = resources
            .database
            .heart_rate()
            .recent_readings(&user_id, limit)
            .await?;

        Ok((StatusCode::OK, Json(readings)).into_response())
    }

    /// Generate a session ending now and store it for the user
    async fn handle_backfill(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
        Query(params): Query<BackfillQuery>,
    ) -> Result<Response, AppError> {
        validate_user_id(&user_id)?;
        let config = &resources.config.heart_rate;
        let duration_seconds = params.duration_seconds.unwrap_or(DEFAULT_SESSION_SECONDS);
        validate_duration(duration_seconds, config.max_simulation_seconds)?;

        let inject = config.inject_anomalies;
        let seed = params.seed;
        let readings = task::spawn_blocking(move || {
            simulate_with_seed(
                duration_seconds,
                inject,
                seed,
                session_start_ending_now(duration_seconds),
            )
        })
        .await
        .map_err(|e| AppError::internal(format!("Simulation task failed: {e}")))?;

        let readings_stored = resources
            .database
            .heart_rate()
            .record_readings(&user_id, &readings)
            .await?;

        let response = BackfillResponse {
            user_id,
            readings_stored,
            duration_seconds,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Scan recent history for anomalies and store new detections
    async fn handle_scan_anomalies(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Response, AppError> {
        validate_user_id(&user_id)?;
        let result = resources.anomaly_scan.scan_user(&user_id).await?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }

    /// Previously stored anomalies, newest first
    async fn handle_stored_anomalies(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
        Query(params): Query<HistoryQuery>,
    ) -> Result<Response, AppError> {
        validate_user_id(&user_id)?;
        let limit = params
            .limit
            .unwrap_or(resources.config.heart_rate.history_limit)
            .max(1);

        let anomalies = resources
            .database
            .anomalies()
            .list_for_user(&user_id, limit)
            .await?;

        Ok((StatusCode::OK, Json(anomalies)).into_response())
    }
}

fn validate_duration(duration_seconds: u32, max: u32) -> AppResult<()> {
    if duration_seconds == 0 || duration_seconds > max {
        return Err(AppError::out_of_range(format!(
            "duration_seconds must be between 1 and {max}, got {duration_seconds}"
        )));
    }
    Ok(())
}

fn validate_user_id(user_id: &str) -> AppResult<()> {
    if user_id.trim().is_empty() {
        return Err(AppError::invalid_input("user_id must not be empty"));
    }
    Ok(())
}
