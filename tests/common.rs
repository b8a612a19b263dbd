// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging, in-memory database, seeded readings, and server resource helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::cast_possible_wrap
)]
//! Shared test utilities for `wellness_pulse`

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use pulse_core::models::HeartRateReading;
use std::env;
use std::sync::{Arc, Once};
use wellness_pulse::{
    config::ServerConfig,
    database::Database,
    server::{build_router, ServerResources},
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:").await?)
}

/// Server resources over a fresh in-memory database
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    create_test_resources_with(ServerConfig::for_testing()).await
}

/// Server resources over a fresh in-memory database with custom configuration
pub async fn create_test_resources_with(config: ServerConfig) -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    Ok(Arc::new(ServerResources::new(database, Arc::new(config))))
}

/// Router over fresh test resources
pub async fn create_test_app() -> Result<(axum::Router, Arc<ServerResources>)> {
    let resources = create_test_resources().await?;
    Ok((build_router(&resources), resources))
}

/// Fixed reference instant for deterministic timestamps
pub fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T07:00:00Z")
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// One reading per second starting at [`base_time`]
pub fn readings_from_bpms(bpms: &[i32]) -> Vec<HeartRateReading> {
    bpms.iter()
        .enumerate()
        .map(|(i, &bpm)| HeartRateReading::new(bpm, base_time() + Duration::seconds(i as i64)))
        .collect()
}

/// 70 flat readings with a low outlier at index 10 and a high one at index 40
///
/// The low reading scores z = -2.86 (medium) and the high one z = 7.18 (high).
pub fn spiky_bpms() -> Vec<i32> {
    let mut bpms = vec![60; 70];
    bpms[10] = 20;
    bpms[40] = 200;
    bpms
}
