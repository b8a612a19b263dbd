// ABOUTME: Application services that combine storage with the heart-rate engine
// ABOUTME: Hosts the per-user anomaly scan and simulated session generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Anomaly scan over stored or simulated history
pub mod anomaly_scan;
/// Simulated sessions from the standard activity plan
pub mod simulation;

pub use anomaly_scan::{
    anomaly_message, AnomalyScanResult, AnomalyScanService, AnomalyScanSettings,
};
pub use simulation::{session_start_ending_now, simulate_session, simulate_with_seed};
