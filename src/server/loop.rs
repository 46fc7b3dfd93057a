// Server loop module
// Accepts connections until a shutdown signal arrives

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::shutdown_signal;
use super::LiveState;
use crate::logger;

/// Accept loop for the vote API
///
/// Must run inside a `tokio::task::LocalSet`: connections are served with
/// `spawn_local`. Returns after a shutdown signal once open connections have
/// finished, or after `write_timeout` seconds, whichever comes first.
pub async fn start_server_loop(listener: TcpListener, state: Arc<LiveState>) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    let remaining = drain_connections(
        &active_connections,
        Duration::from_secs(state.config.performance.write_timeout),
    )
    .await;
    if remaining > 0 {
        logger::log_warning(&format!("Closing with {remaining} connection(s) still open"));
    }
}

/// Wait for open connections to finish, at most `limit`
///
/// Returns how many were still open when waiting stopped.
async fn drain_connections(active: &AtomicUsize, limit: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + limit;
    while active.load(Ordering::SeqCst) > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    active.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_drain_returns_once_connections_close() {
        let active = Arc::new(AtomicUsize::new(2));
        let closer = Arc::clone(&active);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            closer.store(0, Ordering::SeqCst);
        });

        let started = Instant::now();
        let remaining = drain_connections(&active, Duration::from_secs(10)).await;
        assert_eq!(remaining, 0);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_limit() {
        let active = AtomicUsize::new(1);

        let started = Instant::now();
        let remaining = drain_connections(&active, Duration::from_millis(200)).await;
        assert_eq!(remaining, 1);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }
}
