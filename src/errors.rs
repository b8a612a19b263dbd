// ABOUTME: Re-exports the unified error types from pulse-core for the server crate
// ABOUTME: Keeps `crate::errors::AppError` paths stable across routes, services, and storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Error types live in `pulse-core` so the algorithm crate and the server share
//! one code table. `AppError` renders itself as `{"error": {...}}` with the
//! status mapped from its `ErrorCode`.

pub use pulse_core::errors::{
    AppError, AppResult, DatabaseError, ErrorCode, ErrorContext, ErrorResponse,
    ErrorResponseDetails,
};
