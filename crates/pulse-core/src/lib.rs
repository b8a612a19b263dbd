// ABOUTME: Core types and constants for the wellness heart-rate platform
// ABOUTME: Foundation crate with error handling, shared reading models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pulse Core
//!
//! Foundation crate providing shared types and constants for the wellness
//! heart-rate pipeline. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and database errors
//! - **constants**: Physiological bounds, detector thresholds, and service defaults
//! - **models**: Heart-rate readings, activity levels, and anomaly severities

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (readings, activity levels, severities)
pub mod models;
