//! Request dispatcher
//!
//! The per-request decision algorithm, executed once per inbound request
//! with fixed precedence:
//!
//! 1. dynamic render, when the app owns a matching route
//! 2. exact static file under the asset root
//! 3. prerendered `.html` fallback
//! 4. dynamic render anyway, giving the app's own 404 page a chance
//!
//! Stages run strictly in order (later stages depend on earlier "not
//! found" outcomes) and touch no shared mutable state.

pub mod fallback;
pub mod static_files;

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SET_COOKIE};
use hyper::{Method, Request, Response};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::{App, ClientAddr, RenderError};
use crate::logger;
use static_files::{FileContext, ServeOutcome};

/// The request dispatcher: app + static root, shared across connections.
pub struct Dispatcher {
    app: Arc<App>,
    static_root: PathBuf,
    access_log: bool,
}

impl Dispatcher {
    #[must_use]
    pub fn new(app: Arc<App>, static_root: PathBuf, access_log: bool) -> Self {
        Self {
            app,
            static_root,
            access_log,
        }
    }

    /// Dispatch one request. Render failures propagate as `Err`; every
    /// other path produces a well-formed response.
    pub async fn dispatch<B>(
        &self,
        req: Request<B>,
        client: SocketAddr,
    ) -> Result<Response<Full<Bytes>>, RenderError>
    where
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<RenderError>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let version = req.version();

        let response = self.route(req, client).await?;

        if self.access_log {
            let body_bytes =
                usize::try_from(response.body().size_hint().exact().unwrap_or(0)).unwrap_or(0);
            logger::log_access(
                &client,
                &method,
                &path,
                version,
                response.status().as_u16(),
                body_bytes,
            );
        }
        Ok(response)
    }

    /// The precedence chain itself.
    async fn route<B>(
        &self,
        req: Request<B>,
        client: SocketAddr,
    ) -> Result<Response<Full<Bytes>>, RenderError>
    where
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<RenderError>,
    {
        // Stage 1: dynamic match. Terminal for dynamically routed requests.
        if self.app.matches(req.method(), req.uri().path()) {
            return self.render_request(req, client).await;
        }

        let (parts, body) = req.into_parts();
        let rel_path = self.app.remove_base(parts.uri.path()).to_owned();

        // The static stages serve GET and HEAD; other methods go straight
        // to the render-404 stage.
        if parts.method == Method::GET || parts.method == Method::HEAD {
            let ctx = FileContext::from_parts(&parts);

            // Stage 2: exact static file.
            match static_files::resolve_and_serve(&self.static_root, &rel_path, &ctx).await {
                ServeOutcome::Served(resp) | ServeOutcome::Failed(resp) => return Ok(resp),
                ServeOutcome::NotFound => {}
            }

            // Stage 3: prerendered fallback.
            if let Some(page) = fallback::find_prerendered(&self.static_root, &rel_path).await {
                match static_files::serve_path(&page, &ctx).await {
                    ServeOutcome::Served(resp) | ServeOutcome::Failed(resp) => return Ok(resp),
                    // The matched file vanished between walk and read.
                    ServeOutcome::NotFound => {}
                }
            }
        }

        // Stage 4: render anyway; the app supplies its own "not found"
        // page (or whatever status it chooses), returned verbatim.
        self.render_request(Request::from_parts(parts, body), client)
            .await
    }

    /// Run the render capability: inject the client address, collect the
    /// body, render, then append each `Set-Cookie` value as a distinct
    /// header instance (a multi-value header is never comma-joined).
    async fn render_request<B>(
        &self,
        req: Request<B>,
        client: SocketAddr,
    ) -> Result<Response<Full<Bytes>>, RenderError>
    where
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<RenderError>,
    {
        let (mut parts, body) = req.into_parts();
        parts.extensions.insert(ClientAddr(client.ip()));
        let bytes = body.collect().await.map_err(Into::into)?.to_bytes();

        let outcome = self.app.render(Request::from_parts(parts, bytes)).await?;

        let mut response = outcome.response;
        for cookie in &outcome.set_cookies {
            match HeaderValue::from_str(cookie) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(_) => logger::log_warning("Dropping Set-Cookie value with invalid bytes"),
            }
        }
        Ok(response)
    }
}
