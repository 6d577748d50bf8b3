//! Build manifest
//!
//! The build pipeline emits a JSON manifest describing the routes the
//! render capability owns. The gateway consumes it opaquely: it never
//! re-parses application source, only this description.

use serde::Deserialize;
use std::path::Path;

fn default_base() -> String {
    "/".to_string()
}

/// Build-time route and asset description.
#[derive(Debug, Deserialize, Clone)]
pub struct Manifest {
    /// Base path the application is mounted under.
    #[serde(default = "default_base")]
    pub base: String,
    /// Routes owned by the render capability.
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

/// One dynamically rendered route.
#[derive(Debug, Deserialize, Clone)]
pub struct RouteSpec {
    /// Route pattern: literal segments, `[param]` or a trailing `[...rest]`.
    pub pattern: String,
    /// Methods this route answers. Empty means any method.
    #[serde(default)]
    pub methods: Vec<String>,
}

impl Manifest {
    /// An empty manifest: no dynamic routes, root base.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            base: default_base(),
            routes: Vec::new(),
        }
    }

    /// Parse a manifest from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Read and parse a manifest file. The file is read once at process
    /// start; the manifest is immutable afterwards.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_json(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_manifest() {
        let manifest = Manifest::from_json(
            br#"{
                "base": "/docs",
                "routes": [
                    {"pattern": "/", "methods": ["GET"]},
                    {"pattern": "/api/search", "methods": ["GET", "POST"]},
                    {"pattern": "/blog/[slug]"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.base, "/docs");
        assert_eq!(manifest.routes.len(), 3);
        assert_eq!(manifest.routes[1].methods, vec!["GET", "POST"]);
        assert!(manifest.routes[2].methods.is_empty());
    }

    #[test]
    fn base_defaults_to_root() {
        let manifest = Manifest::from_json(br#"{"routes": []}"#).unwrap();
        assert_eq!(manifest.base, "/");
    }

    #[test]
    fn empty_manifest_has_no_routes() {
        assert!(Manifest::empty().routes.is_empty());
    }
}
