// ABOUTME: Tests for loading heart-rate server configuration from environment variables
// ABOUTME: Runs serially because every test mutates process-wide environment state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use pulse_core::errors::ErrorCode;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use wellness_pulse::config::{AnomalyDedupPolicy, DatabaseUrl, ServerConfig};

const MANAGED_VARS: &[&str] = &[
    "HTTP_PORT",
    "DATABASE_URL",
    "CORS_ALLOWED_ORIGINS",
    "HEART_RATE_STREAM_INTERVAL_MS",
    "HEART_RATE_INJECT_ANOMALIES",
    "HEART_RATE_PERSIST_STREAM",
    "HEART_RATE_HISTORY_LIMIT",
    "HEART_RATE_ANOMALY_SCAN_LIMIT",
    "HEART_RATE_SIMULATION_FALLBACK_MIN",
    "HEART_RATE_MAX_SIMULATION_SECONDS",
    "ANOMALY_DEDUP_POLICY",
];

fn clear_env() {
    for key in MANAGED_VARS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_when_unset() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8081);
    assert_eq!(config.heart_rate.stream_interval_ms, 1000);
    assert!(config.heart_rate.inject_anomalies);
    assert!(!config.heart_rate.persist_stream);
    assert_eq!(config.heart_rate.history_limit, 100);
    assert_eq!(config.heart_rate.anomaly_scan_limit, 5000);
    assert_eq!(config.heart_rate.simulation_fallback_min, 10);
    assert_eq!(config.heart_rate.dedup_policy, AnomalyDedupPolicy::PerReading);
    assert_eq!(config.cors.allowed_origins, "*");
}

#[test]
#[serial]
fn test_heart_rate_overrides() {
    clear_env();
    env::set_var("HEART_RATE_STREAM_INTERVAL_MS", "250");
    env::set_var("HEART_RATE_INJECT_ANOMALIES", "no");
    env::set_var("HEART_RATE_PERSIST_STREAM", "1");
    env::set_var("HEART_RATE_ANOMALY_SCAN_LIMIT", "2000");
    env::set_var("ANOMALY_DEDUP_POLICY", "once-per-type");
    env::set_var("DATABASE_URL", "sqlite:./data/pulse.db");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.heart_rate.stream_interval_ms, 250);
    assert!(!config.heart_rate.inject_anomalies);
    assert!(config.heart_rate.persist_stream);
    assert_eq!(config.heart_rate.anomaly_scan_limit, 2000);
    assert_eq!(config.heart_rate.dedup_policy, AnomalyDedupPolicy::OncePerType);
    assert_eq!(
        config.database,
        DatabaseUrl::SQLite {
            path: PathBuf::from("./data/pulse.db")
        }
    );
}

#[test]
#[serial]
fn test_malformed_number_is_a_config_error() {
    clear_env();
    env::set_var("HEART_RATE_HISTORY_LIMIT", "lots");

    let err = ServerConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(err.code, ErrorCode::ConfigError);
    assert!(err.message.contains("HEART_RATE_HISTORY_LIMIT"));
}

#[test]
#[serial]
fn test_malformed_flag_is_a_config_error() {
    clear_env();
    env::set_var("HEART_RATE_INJECT_ANOMALIES", "maybe");

    let result = ServerConfig::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_zero_stream_interval_fails_validation() {
    clear_env();
    env::set_var("HEART_RATE_STREAM_INTERVAL_MS", "0");

    let result = ServerConfig::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_postgres_url_is_rejected() {
    clear_env();
    env::set_var("DATABASE_URL", "postgres://localhost/pulse");

    let result = ServerConfig::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_unknown_dedup_policy_falls_back_to_default() {
    clear_env();
    env::set_var("ANOMALY_DEDUP_POLICY", "sometimes");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.heart_rate.dedup_policy, AnomalyDedupPolicy::PerReading);
}
