//! Preview server binary
//!
//! Serves a build's static and prerendered output standalone. There is no
//! real render engine here, so unmatched requests get a plain 404 page —
//! embedding hosts with a renderer use the library API instead.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ssrgate::app::manifest::Manifest;
use ssrgate::{App, Dispatcher, Options, Render, RenderFuture, RenderOutcome};

/// Stand-in render capability: always the plain 404 page.
struct NotFoundRender;

impl Render for NotFoundRender {
    fn render(&self, _req: Request<Bytes>) -> RenderFuture {
        Box::pin(async {
            let response = Response::builder()
                .status(StatusCode::NOT_FOUND)
                .header("Content-Type", "text/html; charset=utf-8")
                .body(Full::new(Bytes::from(
                    "<!DOCTYPE html><html><body><h1>404: Not found</h1></body></html>",
                )))?;
            Ok(RenderOutcome::of(response))
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let options = Options::load()?;
    ssrgate::logger::init(&options)?;

    // Manifest is optional for a pure static preview.
    let manifest_path = PathBuf::from(&options.manifest);
    let manifest = if manifest_path.is_file() {
        Manifest::load(&manifest_path)?
    } else {
        Manifest::empty()
    };

    let app = Arc::new(App::new(manifest, Arc::new(NotFoundRender)));
    let dispatcher = Arc::new(Dispatcher::new(
        app,
        Path::new(&options.static_root).to_path_buf(),
        options.access_log,
    ));

    let Some(handle) = ssrgate::start(dispatcher, &options)? else {
        ssrgate::logger::log_warning("start disabled by options; nothing to serve");
        return Ok(());
    };

    tokio::signal::ctrl_c().await?;
    handle.stop().await;
    Ok(())
}
