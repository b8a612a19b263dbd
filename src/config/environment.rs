// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database location, CORS, and heart-rate pipeline tuning from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use crate::errors::{AppError, AppResult};
use pulse_core::constants::defaults;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn, Level};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational output
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            // Default fallback
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            // Default fallback for unrecognized values
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a testing environment
    #[must_use]
    pub const fn is_testing(self) -> bool {
        matches!(self, Self::Testing)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for URLs naming a database other than `SQLite`
    pub fn parse_url(s: &str) -> AppResult<Self> {
        let trimmed = s.trim();
        if trimmed.starts_with("postgres://") || trimmed.starts_with("postgresql://") {
            return Err(AppError::config(
                "Only SQLite databases are supported by the heart-rate service",
            ));
        }

        let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
        let path_str = path_str.strip_prefix("//").unwrap_or(path_str);
        if path_str == ":memory:" || path_str.is_empty() {
            Ok(Self::Memory)
        } else {
            Ok(Self::SQLite {
                path: PathBuf::from(path_str),
            })
        }
    }

    /// Convert to a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(
                defaults::DATABASE_URL
                    .strip_prefix("sqlite:")
                    .unwrap_or(defaults::DATABASE_URL),
            ),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// How repeated anomaly scans treat detections that were already stored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyDedupPolicy {
    /// Skip a detection whose reading timestamp is already stored for the user
    #[default]
    PerReading,
    /// Store at most one heart-rate anomaly per user, ever
    OncePerType,
    /// Store every detection
    Disabled,
}

impl AnomalyDedupPolicy {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "once_per_type" | "once" => Self::OncePerType,
            "disabled" | "none" | "off" => Self::Disabled,
            _ => Self::PerReading,
        }
    }
}

impl fmt::Display for AnomalyDedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerReading => write!(f, "per_reading"),
            Self::OncePerType => write!(f, "once_per_type"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// Tuning for the heart-rate stream, history, and anomaly scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateConfig {
    /// Delay between streamed readings in milliseconds
    pub stream_interval_ms: u64,
    /// Inject arrhythmias into streamed and simulated signals
    pub inject_anomalies: bool,
    /// Store every streamed reading
    pub persist_stream: bool,
    /// Default number of readings returned by the history endpoint
    pub history_limit: u32,
    /// Most recent readings considered by an anomaly scan
    pub anomaly_scan_limit: u32,
    /// Below this many stored readings, scans run on a simulated session
    pub simulation_fallback_min: u32,
    /// Upper bound for simulated or backfilled sessions, in seconds
    pub max_simulation_seconds: u32,
    /// Duplicate handling for stored anomalies
    pub dedup_policy: AnomalyDedupPolicy,
}

impl HeartRateConfig {
    /// Stream tick interval
    #[must_use]
    pub const fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }

    fn from_env() -> AppResult<Self> {
        Ok(Self {
            stream_interval_ms: parse_env(
                "HEART_RATE_STREAM_INTERVAL_MS",
                defaults::STREAM_INTERVAL_MS,
            )?,
            inject_anomalies: parse_bool_env("HEART_RATE_INJECT_ANOMALIES", true)?,
            persist_stream: parse_bool_env("HEART_RATE_PERSIST_STREAM", false)?,
            history_limit: parse_env("HEART_RATE_HISTORY_LIMIT", defaults::HISTORY_LIMIT)?,
            anomaly_scan_limit: parse_env(
                "HEART_RATE_ANOMALY_SCAN_LIMIT",
                defaults::ANOMALY_SCAN_LIMIT,
            )?,
            simulation_fallback_min: parse_env(
                "HEART_RATE_SIMULATION_FALLBACK_MIN",
                defaults::SIMULATION_FALLBACK_MIN,
            )?,
            max_simulation_seconds: parse_env(
                "HEART_RATE_MAX_SIMULATION_SECONDS",
                defaults::MAX_SIMULATION_SECONDS,
            )?,
            dedup_policy: AnomalyDedupPolicy::from_str_or_default(&env_var_or(
                "ANOMALY_DEDUP_POLICY",
                "per_reading",
            )),
        })
    }
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            stream_interval_ms: defaults::STREAM_INTERVAL_MS,
            inject_anomalies: true,
            persist_stream: false,
            history_limit: defaults::HISTORY_LIMIT,
            anomaly_scan_limit: defaults::ANOMALY_SCAN_LIMIT,
            simulation_fallback_min: defaults::SIMULATION_FALLBACK_MIN,
            max_simulation_seconds: defaults::MAX_SIMULATION_SECONDS,
            dedup_policy: AnomalyDedupPolicy::default(),
        }
    }
}

/// Cross-origin settings for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origins, or `*`
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".to_owned(),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Database location
    pub database: DatabaseUrl,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Heart-rate pipeline tuning
    pub heart_rate: HeartRateConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed, or the
    /// resulting configuration fails validation
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: parse_env("HTTP_PORT", defaults::HTTP_PORT)?,
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            database: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", defaults::DATABASE_URL))?,
            cors: CorsConfig {
                allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            },
            heart_rate: HeartRateConfig::from_env()?,
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Configuration for tests: in-memory database and a fast stream
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            http_port: 0,
            environment: Environment::Testing,
            log_level: LogLevel::Warn,
            database: DatabaseUrl::Memory,
            cors: CorsConfig::default(),
            heart_rate: HeartRateConfig {
                stream_interval_ms: 10,
                ..HeartRateConfig::default()
            },
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error when a value would make the service unusable
    pub fn validate(&self) -> AppResult<()> {
        let hr = &self.heart_rate;
        if hr.stream_interval_ms == 0 {
            return Err(AppError::config(
                "HEART_RATE_STREAM_INTERVAL_MS must be greater than zero",
            ));
        }
        if hr.history_limit == 0 {
            return Err(AppError::config(
                "HEART_RATE_HISTORY_LIMIT must be greater than zero",
            ));
        }
        if hr.anomaly_scan_limit == 0 {
            return Err(AppError::config(
                "HEART_RATE_ANOMALY_SCAN_LIMIT must be greater than zero",
            ));
        }
        if hr.max_simulation_seconds == 0 {
            return Err(AppError::config(
                "HEART_RATE_MAX_SIMULATION_SECONDS must be greater than zero",
            ));
        }
        if hr.simulation_fallback_min > hr.anomaly_scan_limit {
            warn!(
                fallback_min = hr.simulation_fallback_min,
                scan_limit = hr.anomaly_scan_limit,
                "Simulation fallback threshold exceeds scan limit; every scan will be simulated"
            );
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Wellness Pulse Configuration:\n\
             - Environment: {}\n\
             - HTTP Port: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - CORS Origins: {}\n\
             - Stream Interval: {} ms\n\
             - Anomaly Injection: {}\n\
             - Persist Stream: {}\n\
             - Anomaly Scan Limit: {}\n\
             - Anomaly Dedup Policy: {}",
            self.environment,
            self.http_port,
            self.log_level,
            self.database,
            self.cors.allowed_origins,
            self.heart_rate.stream_interval_ms,
            if self.heart_rate.inject_anomalies {
                "Enabled"
            } else {
                "Disabled"
            },
            if self.heart_rate.persist_stream {
                "Enabled"
            } else {
                "Disabled"
            },
            self.heart_rate.anomaly_scan_limit,
            self.heart_rate.dedup_policy,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse a boolean flag accepting `true/false/1/0/yes/no`
fn parse_bool_env(key: &str, default: bool) -> AppResult<bool> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(AppError::config(format!("Invalid {key} value '{raw}'"))),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("nonsense"), LogLevel::Info);
        assert_eq!(LogLevel::Trace.to_tracing_level(), Level::TRACE);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(
            Environment::from_str_or_default("staging"),
            Environment::Development
        );
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_database_url_parsing() {
        let file = DatabaseUrl::parse_url("sqlite:./data/test.db").unwrap();
        assert!(!file.is_memory());
        assert_eq!(file.to_connection_string(), "sqlite:./data/test.db");

        assert!(DatabaseUrl::parse_url("sqlite::memory:").unwrap().is_memory());
        assert!(DatabaseUrl::parse_url("postgres://localhost/db").is_err());

        let bare = DatabaseUrl::parse_url("./pulse.db").unwrap();
        assert_eq!(bare.to_connection_string(), "sqlite:./pulse.db");
    }

    #[test]
    fn test_dedup_policy_parsing() {
        assert_eq!(
            AnomalyDedupPolicy::from_str_or_default("once-per-type"),
            AnomalyDedupPolicy::OncePerType
        );
        assert_eq!(
            AnomalyDedupPolicy::from_str_or_default("DISABLED"),
            AnomalyDedupPolicy::Disabled
        );
        assert_eq!(
            AnomalyDedupPolicy::from_str_or_default(""),
            AnomalyDedupPolicy::PerReading
        );
    }

    #[test]
    fn test_validation_rejects_zero_interval() {
        let mut config = ServerConfig::for_testing();
        assert!(config.validate().is_ok());

        config.heart_rate.stream_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_mentions_key_settings() {
        let summary = ServerConfig::for_testing().summary();
        assert!(summary.contains("sqlite::memory:"));
        assert!(summary.contains("per_reading"));
        assert!(summary.contains("Stream Interval: 10 ms"));
    }
}
