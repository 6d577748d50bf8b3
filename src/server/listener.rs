//! Listener creation
//!
//! Builds the TCP listener the lifecycle manager owns. `SO_REUSEADDR` is
//! set so a stopped gateway can rebind its port without waiting out
//! TIME_WAIT; a second `start` against a live address still surfaces the
//! platform's address-in-use error.

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Create a bound, non-blocking `TcpListener` for the accept loop.
pub fn create_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    // Non-blocking is required before handing the fd to tokio.
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
