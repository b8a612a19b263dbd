// ABOUTME: Heart-rate time-series engine: synthetic signal generator and anomaly detector
// ABOUTME: Pure computation with injectable randomness, no I/O or shared mutable state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pulse Intelligence
//!
//! The heart-rate pipeline consists of two independent pieces:
//!
//! - [`HeartRateGenerator`] produces a plausible bpm value per tick for a subject
//!   moving through activity phases, optionally injecting tachycardia and
//!   bradycardia spikes. Each simulated stream owns its own instance.
//! - [`detect_anomalies`] scans an already collected batch for z-score outliers.
//!   It is stateless and safe to call concurrently on independent batches.
//!
//! Randomness is routed through [`RandomSource`] so tests can substitute a
//! scripted source and assert exact sequences.

/// Activity to base-rate range table
pub mod activity_table;
/// Statistical outlier detection over reading batches
pub mod detector;
/// Stateful per-stream heart-rate signal generator
pub mod generator;
/// Activity phase plans and bulk history generation
pub mod history;
/// Injectable random source abstraction
pub mod random;

pub use activity_table::{ActivityRangeTable, BaseRateRange};
pub use detector::{classify_z_score, detect_anomalies, AnomalyRecord, BatchStatistics};
pub use generator::{GeneratedBeat, HeartRateGenerator, InjectedArrhythmia};
pub use history::{generate_history, ActivityPhase, PhasePlan};
pub use random::{RandomSource, RngSource};
