// ABOUTME: Server resources container and HTTP server bootstrap
// ABOUTME: Assembles the axum router with tracing and CORS layers and serves it with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Module
//!
//! [`ServerResources`] holds the shared handles every route needs. It is
//! created once at startup and shared behind an `Arc`.

use crate::config::ServerConfig;
use crate::database::{Database, SqliteHeartRateRepository};
use crate::errors::{AppError, AppResult};
use crate::middleware::{create_request_span, setup_cors};
use crate::routes::{HealthRoutes, HeartRateRoutes, HeartRateStreamRoutes};
use crate::services::{AnomalyScanService, AnomalyScanSettings};
use axum::Router;
use std::future::{self, Future};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
#[cfg(unix)]
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared resources injected into every route
pub struct ServerResources {
    /// Heart-rate and anomaly storage
    pub database: Database,
    /// Runtime configuration
    pub config: Arc<ServerConfig>,
    /// Anomaly scan over stored history
    pub anomaly_scan: AnomalyScanService,
}

impl ServerResources {
    /// Wire resources around an open database
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>) -> Self {
        let repository = Arc::new(SqliteHeartRateRepository::new(database.clone()));
        let anomaly_scan =
            AnomalyScanService::new(repository, AnomalyScanSettings::from(&config.heart_rate));
        Self {
            database,
            config,
            anomaly_scan,
        }
    }

    /// Open the configured database and wire resources around it
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the database
    /// cannot be opened
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        config.validate()?;
        let database = Database::new(&config.database.to_connection_string()).await?;
        Ok(Self::new(database, Arc::new(config)))
    }
}

/// Build the full application router
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(HeartRateRoutes::routes(resources.clone()))
        .merge(HeartRateStreamRoutes::routes(resources.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(create_request_span))
        .layer(cors)
}

/// Bind the configured port and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    let address = SocketAddr::from(([0, 0, 0, 0], resources.config.http_port));
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {address}: {e}")))?;

    info!("HTTP server listening on http://{address}");
    serve(listener, resources, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves
///
/// # Errors
///
/// Returns an error if the server fails
pub async fn serve<F>(
    listener: TcpListener,
    resources: Arc<ServerResources>,
    shutdown: F,
) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(&resources);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match unix_signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {e}");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
