// Connection handling module
// Accepts and serves a single TCP connection

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::LiveState;
use crate::handler;
use crate::logger;

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<LiveState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve one connection in a local task.
///
/// Keep-alive follows `performance.keep_alive_timeout`; the whole connection
/// is bounded by the larger of the read and write timeouts.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<LiveState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_duration =
            Duration::from_secs(std::cmp::max(performance.read_timeout, performance.write_timeout));

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, peer_addr, Arc::clone(&service_state))),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
