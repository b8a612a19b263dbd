// ABOUTME: Request tracing helpers for correlation and structured logging
// ABOUTME: Generates request IDs and builds the per-request span used by the HTTP trace layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::http::Request;
use tracing::{field, info_span, Span};
use uuid::Uuid;

/// Header carrying a caller-supplied request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID from the incoming headers, or a freshly generated one
#[must_use]
pub fn request_id_from<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(
            || format!("req_{}", Uuid::new_v4().simple()),
            ToOwned::to_owned,
        )
}

/// Create a tracing span for an HTTP request
///
/// Used as the `make_span_with` hook of the trace layer.
pub fn create_request_span<B>(request: &Request<B>) -> Span {
    info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id_from(request),
        status_code = field::Empty,
        duration_ms = field::Empty,
    )
}

/// Create a tracing span for one live heart-rate stream
pub fn create_stream_span(user_id: &str) -> Span {
    info_span!(
        "heart_rate_stream",
        user_id = %user_id,
        ticks = field::Empty,
    )
}
