// ABOUTME: WebSocket route streaming a live simulated heart-rate signal per connection
// ABOUTME: Each connection owns one generator, ticks on an interval, and accepts activity transitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Live heart-rate stream
//!
//! Every connection to `/ws/heart-rate/:user_id` gets its own
//! [`HeartRateGenerator`], starting at rest. Each tick sends one reading as
//! `{"bpm", "timestamp", "activity"}`. Clients switch activity by sending
//! `{"type": "transition", "activity": "running"}`. Unrecognized activity labels
//! fall back to the default base rate instead of failing.

use crate::{logging::AppLogger, middleware::create_stream_span, server::ServerResources};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use pulse_core::models::{ActivityLevel, HeartRateReading};
use pulse_intelligence::{HeartRateGenerator, RandomSource, RngSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn, Instrument};

/// Commands a client may send on the stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamCommand {
    /// Move the simulated subject to another activity
    #[serde(rename = "transition")]
    Transition {
        /// Target activity
        activity: ActivityLevel,
    },
}

/// Control messages sent besides readings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamNotice {
    /// A client message could not be understood
    #[serde(rename = "error")]
    Error {
        /// What went wrong
        message: String,
    },
}

/// Live heart-rate stream routes
pub struct HeartRateStreamRoutes;

impl HeartRateStreamRoutes {
    /// Create the stream route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/ws/heart-rate/:user_id", get(Self::handle_websocket))
            .with_state(resources)
    }

    /// Upgrade the connection and start streaming
    async fn handle_websocket(
        ws: WebSocketUpgrade,
        Path(user_id): Path<String>,
        State(resources): State<Arc<ServerResources>>,
    ) -> impl IntoResponse {
        debug!(user_id, "Heart-rate stream connection request");
        let span = create_stream_span(&user_id);
        ws.on_upgrade(move |socket: WebSocket| {
            run_stream(socket, user_id, resources).instrument(span)
        })
    }
}

async fn run_stream(socket: WebSocket, user_id: String, resources: Arc<ServerResources>) {
    let config = &resources.config.heart_rate;
    let persist = config.persist_stream;
    let mut generator = HeartRateGenerator::new(
        ActivityLevel::Resting,
        config.inject_anomalies,
        RngSource::from_entropy(),
    );

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if ws_tx.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut ticker = time::interval(config.stream_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    AppLogger::log_stream_session(&user_id, "opened", 0);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let beat = generator.next_beat();
                if let Some(kind) = beat.injected {
                    debug!(?kind, bpm = beat.bpm, "Injected arrhythmia");
                }
                let reading = HeartRateReading::new(beat.bpm, Utc::now())
                    .with_activity(generator.activity());

                if persist {
                    if let Err(e) = resources
                        .database
                        .heart_rate()
                        .record_reading(&user_id, &reading)
                        .await
                    {
                        warn!("Failed to persist streamed reading: {e}");
                    }
                }

                match serde_json::to_string(&reading) {
                    Ok(json) => {
                        if tx.send(Message::Text(json)).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Failed to serialize streamed reading: {e}"),
                }
            }
            incoming = ws_rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    handle_command(&text, &user_id, &mut generator, &tx);
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }

    AppLogger::log_stream_session(&user_id, "closed", generator.elapsed_ticks());
    send_task.abort();
}

fn handle_command<R: RandomSource>(
    text: &str,
    user_id: &str,
    generator: &mut HeartRateGenerator<R>,
    tx: &mpsc::UnboundedSender<Message>,
) {
    match serde_json::from_str::<StreamCommand>(text) {
        Ok(StreamCommand::Transition { activity }) => {
            debug!(%activity, "Activity transition");
            generator.transition_activity(activity);
        }
        Err(e) => {
            AppLogger::log_rejected_input(user_id, &e.to_string());
            let notice = StreamNotice::Error {
                message: format!("Invalid message format: {e}"),
            };
            if let Ok(json) = serde_json::to_string(&notice) {
                if let Err(send_err) = tx.send(Message::Text(json)) {
                    warn!(send_error = ?send_err, "Failed to send stream error notice");
                }
            }
        }
    }
}
