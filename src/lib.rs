//! ssrgate — request-serving shim for server-rendered applications.
//!
//! For every inbound request the gateway decides between the dynamic
//! renderer, an exact static asset, and a prerendered HTML fallback, and
//! otherwise lets the application render its own "not found" page. The
//! render engine and the build pipeline are external collaborators: the
//! gateway consumes a build [`app::manifest::Manifest`] and an opaque
//! [`app::Render`] capability.
//!
//! Embedding hosts use [`server::start`] / [`server::ServerHandle`] for
//! the listener lifecycle, or [`app::App::handle`] to render single
//! requests through their own network layer.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod logger;
pub mod server;

pub use app::{App, ClientAddr, Render, RenderError, RenderFuture, RenderOutcome};
pub use config::Options;
pub use dispatch::Dispatcher;
pub use server::{start, ServerHandle};
