// ABOUTME: System-wide constants for the heart-rate pipeline and service defaults
// ABOUTME: Physiological bounds, signal shape parameters, detector thresholds, and ports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded constants grouped by domain. Values that operators may tune live in
//! the server's environment configuration; the ones here are fixed properties of
//! the signal model and the detector.

/// Heart-rate signal model constants
pub mod heart_rate {
    /// Lowest value the generator ever emits
    pub const MIN_BPM: i32 = 40;
    /// Highest value the generator ever emits
    pub const MAX_BPM: i32 = 200;
    /// Base rate used when an activity has no configured range
    pub const FALLBACK_BASE_RATE: i32 = 70;

    /// Amplitude of the slow sinusoidal component in bpm
    pub const WAVE_AMPLITUDE: f64 = 3.0;
    /// Tick count is divided by this before taking the sine
    pub const WAVE_TICK_DIVISOR: f64 = 10.0;
    /// Measurement noise is drawn from `[-NOISE_BOUND, NOISE_BOUND)`
    pub const NOISE_BOUND: f64 = 2.0;

    /// Per-tick probability of an injected arrhythmia
    pub const INJECTION_PROBABILITY: f64 = 0.20;
    /// Tachycardia spike added to the reading (inclusive)
    pub const TACHYCARDIA_SPIKE: (i32, i32) = (40, 70);
    /// Bradycardia drop subtracted from the reading (inclusive)
    pub const BRADYCARDIA_DROP: (i32, i32) = (30, 50);

    /// Lowest value accepted from a manually recorded reading
    pub const MIN_RECORDABLE_BPM: i32 = 20;
    /// Highest value accepted from a manually recorded reading
    pub const MAX_RECORDABLE_BPM: i32 = 250;
}

/// Statistical anomaly detector constants
pub mod anomaly {
    /// Fewer samples than this yield no anomalies
    pub const MIN_SAMPLE_SIZE: usize = 50;
    /// Readings with |z| above this are flagged
    pub const Z_SCORE_THRESHOLD: f64 = 2.5;
    /// Flagged readings with |z| above this are high severity
    pub const HIGH_SEVERITY_Z_SCORE: f64 = 3.0;
    /// Anomaly type stored for heart-rate detections
    pub const HEART_RATE_ANOMALY_TYPE: &str = "heart_rate";
}

/// Default values for environment-driven configuration
pub mod defaults {
    /// HTTP API port
    pub const HTTP_PORT: u16 = 8081;
    /// `SQLite` database location
    pub const DATABASE_URL: &str = "sqlite:./data/wellness.db";
    /// Delay between streamed readings
    pub const STREAM_INTERVAL_MS: u64 = 1000;
    /// Readings returned by the history endpoint
    pub const HISTORY_LIMIT: u32 = 100;
    /// Readings considered by an anomaly scan
    pub const ANOMALY_SCAN_LIMIT: u32 = 5000;
    /// Below this many stored readings a scan runs on simulated data
    pub const SIMULATION_FALLBACK_MIN: u32 = 10;
    /// Length of the simulated session used by the fallback scan
    pub const SIMULATION_FALLBACK_TICKS: u32 = 1800;
    /// Upper bound for simulated or backfilled sessions
    pub const MAX_SIMULATION_SECONDS: u32 = 86_400;
}

/// Service identifiers used in logs and health responses
pub mod service_names {
    /// Main server binary
    pub const WELLNESS_PULSE_SERVER: &str = "wellness-pulse-server";
}
