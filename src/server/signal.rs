// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C) stop the accept loop. On non-Unix targets only
// Ctrl+C is observed.

use crate::logger;

/// Resolves once a shutdown signal has been received
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            logger::log_error(&format!("Failed to register SIGTERM handler: {e}"));
            return wait_ctrl_c().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {}
        () = wait_ctrl_c() => {}
    }
    logger::log_shutdown();
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    wait_ctrl_c().await;
    logger::log_shutdown();
}

async fn wait_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}
