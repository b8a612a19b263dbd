// ABOUTME: Main library entry point for the wellness heart-rate service
// ABOUTME: Exposes configuration, persistence, services, and the axum HTTP/WebSocket server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Wellness Pulse
//!
//! Heart-rate backend for a wellness dashboard. The signal generator and the
//! z-score anomaly detector live in `pulse-intelligence`; this crate wires them
//! to `SQLite` storage and to HTTP and WebSocket endpoints.
//!
//! ## Architecture
//!
//! - **Config**: environment-driven `ServerConfig`
//! - **Database**: readings and anomalies per user (sqlx / `SQLite`)
//! - **Services**: anomaly scans and simulated sessions
//! - **Routes**: health, REST heart-rate endpoints, live stream
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wellness_pulse::config::ServerConfig;
//! use wellness_pulse::errors::AppResult;
//! use wellness_pulse::server::{self, ServerResources};
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::from_config(config).await?);
//!     server::run(resources).await
//! }
//! ```

/// Environment configuration
pub mod config;

/// `SQLite` storage for readings and anomalies
pub mod database;

/// Error types re-exported from `pulse-core`
pub mod errors;

/// Structured logging setup and helpers
pub mod logging;

/// HTTP middleware (CORS, request tracing)
pub mod middleware;

/// HTTP and WebSocket routes
pub mod routes;

/// Server resources and bootstrap
pub mod server;

/// Anomaly scan and simulation services
pub mod services;

pub use pulse_core::constants;
pub use pulse_core::models;
