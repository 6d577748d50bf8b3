//! Renderable application
//!
//! `App` pairs the build manifest with the render capability supplied by
//! the excluded rendering engine. It is constructed once at startup and
//! shared read-only across every dispatch.

pub mod manifest;
pub mod matcher;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use std::sync::Arc;

use crate::logger;
use manifest::Manifest;
use matcher::RoutePattern;

/// Error surfaced by the render capability. Not recovered by the
/// dispatcher; it propagates to the connection's top-level handler.
pub type RenderError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by [`Render::render`].
pub type RenderFuture =
    Pin<Box<dyn Future<Output = Result<RenderOutcome, RenderError>> + Send>>;

/// Resolved client address, injected into the request extensions by the
/// lifecycle manager before the render capability runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub IpAddr);

/// What a render produces: the response plus any `Set-Cookie` values
/// collected during rendering. Cookies travel out-of-band so the
/// dispatcher can append each one as its own header instance.
pub struct RenderOutcome {
    pub response: Response<Full<Bytes>>,
    pub set_cookies: Vec<String>,
}

impl RenderOutcome {
    /// A cookie-less outcome.
    #[must_use]
    pub fn of(response: Response<Full<Bytes>>) -> Self {
        Self {
            response,
            set_cookies: Vec::new(),
        }
    }
}

/// The opaque render capability: given a request, produce a response.
/// Expected to produce the application's 404 page for unmatched paths.
pub trait Render: Send + Sync {
    fn render(&self, req: Request<Bytes>) -> RenderFuture;
}

/// A compiled dynamic route: pattern plus allowed methods (empty = any).
struct CompiledRoute {
    pattern: RoutePattern,
    methods: Vec<Method>,
}

/// The renderable application. Immutable after construction.
pub struct App {
    manifest: Manifest,
    routes: Vec<CompiledRoute>,
    renderer: Arc<dyn Render>,
}

impl App {
    /// Build an `App` from a manifest and a render capability. Route
    /// patterns are compiled once here; unparseable method names in the
    /// manifest are dropped with a warning.
    pub fn new(manifest: Manifest, renderer: Arc<dyn Render>) -> Self {
        let routes = manifest
            .routes
            .iter()
            .map(|spec| CompiledRoute {
                pattern: RoutePattern::parse(&spec.pattern),
                methods: spec
                    .methods
                    .iter()
                    .filter_map(|m| {
                        Method::from_bytes(m.as_bytes()).map_or_else(
                            |_| {
                                logger::log_warning(&format!(
                                    "Manifest route {} has invalid method {m:?}",
                                    spec.pattern
                                ));
                                None
                            },
                            Some,
                        )
                    })
                    .collect(),
            })
            .collect();
        Self {
            manifest,
            routes,
            renderer,
        }
    }

    /// Whether the app owns a dynamic route for this method and path.
    /// The path includes the configured base.
    #[must_use]
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        let Some(rel) = self.base_relative(path) else {
            return false;
        };
        self.routes.iter().any(|route| {
            (route.methods.is_empty() || route.methods.contains(method))
                && route.pattern.matches(rel)
        })
    }

    /// Strip the configured base from a request path for static-asset
    /// resolution. Paths outside the base pass through unchanged.
    #[must_use]
    pub fn remove_base<'a>(&self, path: &'a str) -> &'a str {
        self.base_relative(path).unwrap_or(path)
    }

    /// The path relative to the base, or None when outside the base.
    fn base_relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        let base = self.manifest.base.trim_end_matches('/');
        if base.is_empty() {
            return Some(path);
        }
        match path.strip_prefix(base) {
            Some("") => Some("/"),
            Some(rest) if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }

    /// Invoke the render capability.
    pub async fn render(&self, req: Request<Bytes>) -> Result<RenderOutcome, RenderError> {
        self.renderer.render(req).await
    }

    /// Stateless escape hatch for embedding hosts that own their network
    /// layer: render a single request without the listener or the static
    /// fallback chain.
    pub async fn handle(&self, req: Request<Bytes>) -> Result<Response<Full<Bytes>>, RenderError> {
        Ok(self.render(req).await?.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifest::RouteSpec;

    struct NullRender;

    impl Render for NullRender {
        fn render(&self, _req: Request<Bytes>) -> RenderFuture {
            Box::pin(async {
                Ok(RenderOutcome::of(Response::new(Full::new(Bytes::new()))))
            })
        }
    }

    fn app_with(base: &str, routes: Vec<(&str, Vec<&str>)>) -> App {
        let manifest = Manifest {
            base: base.to_string(),
            routes: routes
                .into_iter()
                .map(|(pattern, methods)| RouteSpec {
                    pattern: pattern.to_string(),
                    methods: methods.into_iter().map(String::from).collect(),
                })
                .collect(),
        };
        App::new(manifest, Arc::new(NullRender))
    }

    #[test]
    fn matches_dynamic_route() {
        let app = app_with("/", vec![("/api/search", vec!["GET", "POST"])]);
        assert!(app.matches(&Method::GET, "/api/search"));
        assert!(app.matches(&Method::POST, "/api/search"));
        assert!(!app.matches(&Method::DELETE, "/api/search"));
        assert!(!app.matches(&Method::GET, "/api/other"));
    }

    #[test]
    fn empty_methods_match_any() {
        let app = app_with("/", vec![("/blog/[slug]", vec![])]);
        assert!(app.matches(&Method::GET, "/blog/post-1"));
        assert!(app.matches(&Method::PUT, "/blog/post-1"));
    }

    #[test]
    fn base_path_is_part_of_the_match() {
        let app = app_with("/docs", vec![("/guide", vec!["GET"])]);
        assert!(app.matches(&Method::GET, "/docs/guide"));
        assert!(!app.matches(&Method::GET, "/guide"));
        assert!(!app.matches(&Method::GET, "/docsx/guide"));
    }

    #[test]
    fn remove_base_strips_prefix() {
        let app = app_with("/docs", vec![]);
        assert_eq!(app.remove_base("/docs/assets/app.css"), "/assets/app.css");
        assert_eq!(app.remove_base("/docs"), "/");
        // outside the base: passes through
        assert_eq!(app.remove_base("/other"), "/other");
    }

    #[test]
    fn root_base_is_identity() {
        let app = app_with("/", vec![]);
        assert_eq!(app.remove_base("/assets/app.css"), "/assets/app.css");
        assert_eq!(app.remove_base("/"), "/");
    }
}
