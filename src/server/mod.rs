//! Server lifecycle
//!
//! Owns the listening socket and the accept loop. `start` returns an
//! explicit [`ServerHandle`]; callers hold it and drive `stop`/`running`
//! through it — there is no process-wide server singleton.

pub mod connection;
pub mod listener;

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::Options;
use crate::dispatch::Dispatcher;
use crate::logger;

/// Upper bound on waiting for in-flight connections during `stop`.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a running (or stopped) listener.
///
/// State machine: STOPPED → (`start`) → RUNNING → (`stop`) → STOPPED.
/// `stop` on a stopped handle is a no-op, never an error.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    live: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    in_flight: Arc<AtomicUsize>,
}

impl ServerHandle {
    /// The address the listener is bound to. With `port = 0` in the
    /// options this reports the actual ephemeral port.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Whether the listener is currently accepting connections.
    #[must_use]
    pub fn running(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Gracefully stop the listener: no new connections are accepted,
    /// in-flight requests are drained (bounded wait) rather than
    /// cancelled, and idle keep-alive sessions are closed. Idempotent.
    pub async fn stop(&self) {
        if !self.live.swap(false, Ordering::SeqCst) {
            return;
        }
        // Reaches the accept loop and every live connection.
        let _ = self.shutdown.send(true);
        logger::log_server_stop(&self.addr);

        let deadline = Instant::now() + DRAIN_TIMEOUT;
        while self.in_flight.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Bind the configured address and spawn the accept loop.
///
/// Returns `Ok(None)` without side effects when `options.start` is
/// disabled. A bind failure (address in use, permission denied) is fatal
/// to `start` and surfaced as the `io::Error`; this includes calling
/// `start` again while a handle for the same address is live — that is
/// deliberately not guarded.
pub fn start(dispatcher: Arc<Dispatcher>, options: &Options) -> io::Result<Option<ServerHandle>> {
    if !options.start {
        return Ok(None);
    }

    let addr = options
        .socket_addr()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let listener = listener::create_listener(addr)?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = ServerHandle {
        addr,
        live: Arc::new(AtomicBool::new(true)),
        shutdown: shutdown_tx,
        in_flight: Arc::new(AtomicUsize::new(0)),
    };

    logger::log_server_start(&addr, options);
    tokio::spawn(accept_loop(
        listener,
        dispatcher,
        shutdown_rx,
        Arc::clone(&handle.in_flight),
    ));

    Ok(Some(handle))
}

/// Accept connections until the shutdown signal fires, then drop the
/// listener so no further connections are admitted. Each connection gets
/// its own shutdown receiver so `stop` can end keep-alive sessions.
async fn accept_loop(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    mut shutdown: watch::Receiver<bool>,
    in_flight: Arc<AtomicUsize>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    connection::spawn_connection(
                        stream,
                        peer_addr,
                        Arc::clone(&dispatcher),
                        Arc::clone(&in_flight),
                        shutdown.clone(),
                    );
                }
                Err(e) => {
                    logger::log_error(&format!("Failed to accept connection: {e}"));
                }
            },
            _ = shutdown.changed() => break,
        }
    }
    drop(listener);
}
