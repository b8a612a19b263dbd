// ABOUTME: HTTP and WebSocket server binary for the wellness heart-rate service
// ABOUTME: Loads environment configuration, opens the database, and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Wellness Pulse Server Binary
//!
//! Starts the heart-rate API: simulation, recording, history, anomaly scans,
//! and the live WebSocket stream.

use anyhow::Result;
use clap::Parser;
use std::env;
use std::sync::Arc;
use tracing::{error, info};
use wellness_pulse::{
    config::{DatabaseUrl, ServerConfig},
    logging,
    server::{self, ServerResources},
};

#[derive(Parser)]
#[command(name = "wellness-pulse-server")]
#[command(about = "Wellness Pulse - heart-rate simulation and anomaly detection API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Containers may pass arguments clap does not understand
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using configuration from environment only");
            Args {
                http_port: None,
                database_url: None,
            }
        }
    };

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url.as_deref() {
        config.database = DatabaseUrl::parse_url(database_url)?;
    }

    logging::init_from_env()?;

    info!("Starting Wellness Pulse server");
    info!("{}", config.summary());
    display_available_endpoints(&config);

    let resources = Arc::new(ServerResources::from_config(config).await?);

    if let Err(e) = server::run(resources).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(config: &ServerConfig) {
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let port = config.http_port;

    info!("=== Available API Endpoints ===");
    info!("   Health:            GET  http://{host}:{port}/health");
    info!("   Readiness:         GET  http://{host}:{port}/ready");
    info!("   Simulate:          GET  http://{host}:{port}/api/heart-rate/simulate/{{duration_seconds}}");
    info!("   Record Reading:    POST http://{host}:{port}/api/users/{{user_id}}/heart-rate");
    info!("   History:           GET  http://{host}:{port}/api/users/{{user_id}}/heart-rate/history");
    info!("   Backfill:          POST http://{host}:{port}/api/users/{{user_id}}/heart-rate/backfill");
    info!("   Scan Anomalies:    GET  http://{host}:{port}/api/users/{{user_id}}/heart-rate/anomalies");
    info!("   Stored Anomalies:  GET  http://{host}:{port}/api/users/{{user_id}}/anomalies");
    info!("   Live Stream:       ws://{host}:{port}/ws/heart-rate/{{user_id}}");
    info!("=== End of Endpoint List ===");
}
