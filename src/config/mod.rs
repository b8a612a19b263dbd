// ABOUTME: Configuration module for centralized server settings and parameters
// ABOUTME: Environment-only configuration for the HTTP server and heart-rate pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration for the wellness pulse server
//!
//! All settings come from environment variables; there are no config files.

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AnomalyDedupPolicy, CorsConfig, DatabaseUrl, Environment, HeartRateConfig, LogLevel,
    ServerConfig,
};
