// ABOUTME: Heart-rate history seeder for local development and dashboard demos
// ABOUTME: Generates simulated activity sessions for a user and stores them as readings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Heart-rate history seeder.
//!
//! Populates the database with simulated sessions so the history and anomaly
//! endpoints have data without a live stream.
//!
//! Usage:
//! ```bash
//! # Seed one hour-long session for the demo user
//! cargo run --bin seed-heart-rate-history
//!
//! # Seed for a specific user
//! cargo run --bin seed-heart-rate-history -- --user-id alice
//!
//! # Shorter sessions, one per day for a week
//! cargo run --bin seed-heart-rate-history -- --duration 1800 --sessions 7
//!
//! # Reproducible data without injected arrhythmias
//! cargo run --bin seed-heart-rate-history -- --seed 42 --no-anomalies
//!
//! # Reset readings and anomalies before seeding
//! cargo run --bin seed-heart-rate-history -- --reset
//! ```

use chrono::{Duration, Utc};
use clap::Parser;
use pulse_core::constants::defaults;
use std::env;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::info;
use wellness_pulse::config::DatabaseUrl;
use wellness_pulse::database::Database;
use wellness_pulse::errors::AppError;
use wellness_pulse::services::simulate_with_seed;

/// CLI-specific error type for the seed binary
#[derive(Error, Debug)]
enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] AppError),

    #[error("{0}")]
    Validation(String),
}

type SeedResult<T> = Result<T, SeedError>;

#[derive(Parser)]
#[command(
    name = "seed-heart-rate-history",
    about = "Wellness Pulse Heart-Rate History Seeder",
    long_about = "Populate the database with simulated heart-rate sessions for testing"
)]
struct SeedArgs {
    /// User to seed readings for
    #[arg(long, default_value = "demo-user")]
    user_id: String,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Length of each session in seconds
    #[arg(long, default_value = "3600")]
    duration: u32,

    /// Number of sessions, one per day ending today
    #[arg(long, default_value = "1")]
    sessions: u32,

    /// Reset the user's readings and anomalies before seeding
    #[arg(long)]
    reset: bool,

    /// Disable injected tachycardia and bradycardia spikes
    #[arg(long)]
    no_anomalies: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Random seed for reproducible data (optional)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> SeedResult<()> {
    let args = SeedArgs::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    if args.duration == 0 || args.duration > defaults::MAX_SIMULATION_SECONDS {
        return Err(SeedError::Validation(format!(
            "--duration must be between 1 and {}",
            defaults::MAX_SIMULATION_SECONDS
        )));
    }
    if args.sessions == 0 {
        return Err(SeedError::Validation("--sessions must be at least 1".to_owned()));
    }

    info!("💓 Wellness Pulse Heart-Rate Seeder");
    info!("   User ID: {}", args.user_id);
    info!("   Sessions: {} x {}s", args.sessions, args.duration);
    info!("   Injected anomalies: {}", !args.no_anomalies);

    // Connect to database
    let database_url = args
        .database_url
        .clone()
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| defaults::DATABASE_URL.to_owned());
    let database_url = DatabaseUrl::parse_url(&database_url)?;
    let database = Database::new(&database_url.to_connection_string()).await?;

    if args.reset {
        info!("🗑️  Resetting heart-rate data...");
        let readings = database.heart_rate().delete_readings(&args.user_id).await?;
        let anomalies = database.anomalies().delete_for_user(&args.user_id).await?;
        info!("   Removed {} readings and {} anomalies", readings, anomalies);
    }

    // Initialize RNG seed
    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(12345)
    });
    info!("   Random seed: {}", seed);

    let now = Utc::now();
    let mut total = 0;
    for session in 0..args.sessions {
        let days_back = i64::from(args.sessions - 1 - session);
        let start = now - Duration::days(days_back) - Duration::seconds(i64::from(args.duration));
        let readings = simulate_with_seed(
            args.duration,
            !args.no_anomalies,
            Some(seed.wrapping_add(u64::from(session))),
            start,
        );
        total += database
            .heart_rate()
            .record_readings(&args.user_id, &readings)
            .await?;
        info!("📊 Session {} stored ({} readings)", session + 1, readings.len());
    }

    let stored = database.heart_rate().count_readings(&args.user_id).await?;
    info!("✅ Created {} heart-rate readings", total);
    info!("   User now has {} readings in total", stored);
    info!("");
    info!("🎯 Try the anomaly scan:");
    info!("   GET /api/users/{}/heart-rate/anomalies", args.user_id);

    Ok(())
}
