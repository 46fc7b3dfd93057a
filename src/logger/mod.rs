//! Logger module
//!
//! Thin helpers over `tracing` for:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::error::AppError;
use std::net::SocketAddr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Target used for access log lines, filterable with `RUST_LOG=access=off`
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `logging.level` when set. Should be called once at
/// application startup.
pub fn init(config: &Config) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Vote server listening on http://{addr}");
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    tracing::info!("Data API: {}", config.store.base_url);
    tracing::info!(
        "Voting closes at: {}",
        chrono::DateTime::from_timestamp(config.voting.end_timestamp, 0)
            .map_or_else(|| config.voting.end_timestamp.to_string(), |t| t.to_rfc3339())
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("Connection accepted from {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log an error caught by the request pipeline
pub fn log_request_error(method: &str, path: &str, err: &AppError) {
    let status = err.status_code().as_u16();
    if status >= 500 {
        tracing::error!(status, "An error occurred on {method} {path}: {err}");
    } else {
        tracing::warn!(status, "Rejected {method} {path}: {err}");
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown() {
    tracing::info!("Shutdown signal received, no longer accepting connections");
}
