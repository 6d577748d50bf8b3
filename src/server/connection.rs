//! Connection handling
//!
//! Serves a single accepted TCP connection: HTTP/1.1 with keep-alive,
//! one dispatch per request, in-flight accounting for graceful drain.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::dispatch::Dispatcher;
use crate::logger;

/// Serve an accepted connection on its own task.
///
/// The in-flight counter is incremented here and decremented when the
/// connection finishes; `stop` drains on it. When the shutdown signal
/// fires, the connection finishes its current request and closes instead
/// of waiting for the next keep-alive request. If the peer drops the
/// connection mid-dispatch, the task (and any pending render or file
/// read) is torn down with it.
pub fn spawn_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    in_flight: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) {
    in_flight.fetch_add(1, Ordering::SeqCst);

    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        // Dispatch errors are narrowed to io::Error here; hyper's service
        // bound cannot take the boxed error straight from dispatch.
        let service = service_fn(move |req: Request<Incoming>| {
            let dispatcher = Arc::clone(&dispatcher);
            async move {
                dispatcher
                    .dispatch(req, peer_addr)
                    .await
                    .map_err(std::io::Error::other)
            }
        });

        let conn = http1::Builder::new()
            .keep_alive(true)
            .serve_connection(io, service);
        tokio::pin!(conn);

        let result = tokio::select! {
            r = conn.as_mut() => r,
            _ = shutdown.changed() => {
                conn.as_mut().graceful_shutdown();
                conn.as_mut().await
            }
        };

        // Render failures surface here as the connection error; the
        // dispatcher never synthesizes a response for them.
        if let Err(err) = result {
            logger::log_connection_error(&err);
        }

        in_flight.fetch_sub(1, Ordering::SeqCst);
    });
}
