// ABOUTME: Core data models shared by the algorithms, storage, and HTTP layers
// ABOUTME: Re-exports activity levels, heart-rate readings, and anomaly severities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod activity;
mod heart_rate;

pub use activity::ActivityLevel;
pub use heart_rate::{BpmSample, HeartRateReading, Severity};
