// Listening socket setup
// Binds the API port with address and port reuse so a replacement process can
// start listening while the old one drains

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Pending connection queue size
const LISTEN_BACKLOG: i32 = 128;

/// Bind a non-blocking `TcpListener` on `addr` with `SO_REUSEADDR` set,
/// plus `SO_REUSEPORT` on unix.
pub fn create_reusable_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;

    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    TcpListener::from_std(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_binds_ephemeral_port() {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_second_listener_shares_port() {
        let first = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = first.local_addr().unwrap();

        let second = create_reusable_listener(addr).unwrap();
        assert_eq!(second.local_addr().unwrap(), addr);
    }
}
