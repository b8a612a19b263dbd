// ABOUTME: Route module organization for the wellness heart-rate endpoints
// ABOUTME: Groups health, REST heart-rate, and live WebSocket stream routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Each domain module contains only route definitions and thin handlers that
//! delegate to the database managers and services.

/// Health check and readiness routes
pub mod health;
/// Heart-rate simulation, recording, history, and anomaly routes
pub mod heart_rate;
/// Live heart-rate WebSocket stream
pub mod websocket;

pub use health::HealthRoutes;
pub use heart_rate::HeartRateRoutes;
pub use websocket::HeartRateStreamRoutes;
