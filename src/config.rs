//! Startup configuration
//!
//! `Options` is the immutable startup configuration of the gateway. It is
//! resolved exactly once, from an optional `ssrgate.toml` file plus
//! `SSRGATE_*` environment overrides, and passed explicitly from then on;
//! nothing reads the environment after startup.

use serde::Deserialize;
use std::net::SocketAddr;

/// Immutable startup options.
#[derive(Debug, Deserialize, Clone)]
pub struct Options {
    /// Bind hostname. Defaults to all interfaces.
    pub hostname: String,
    /// Bind port.
    pub port: u16,
    /// Whether `start` actually binds a listener. When false, `start`
    /// is a no-op and the embedding host drives requests via `handle`.
    pub start: bool,
    /// Deployment-mode flag. Only consulted by the build pipeline when
    /// selecting a client variant; runtime dispatch never branches on it.
    pub deployment_mode: bool,
    /// Directory of static and prerendered client assets.
    pub static_root: String,
    /// Path of the build manifest consumed by the preview binary.
    pub manifest: String,
    /// Whether to emit access log lines.
    pub access_log: bool,
    /// Access log file; stdout when unset.
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file; stderr when unset.
    #[serde(default)]
    pub error_log_file: Option<String>,
}

impl Options {
    /// Load options from the default config file name.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("ssrgate")
    }

    /// Load options from `<config_path>.toml` (optional) with `SSRGATE_*`
    /// environment overrides and built-in defaults.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SSRGATE"))
            .set_default("hostname", "0.0.0.0")?
            .set_default("port", 8085)?
            .set_default("start", true)?
            .set_default("deployment_mode", false)?
            .set_default("static_root", "client")?
            .set_default("manifest", "server/manifest.json")?
            .set_default("access_log", true)?
            .build()?;

        settings.try_deserialize()
    }

    /// The socket address `start` binds.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.hostname, self.port)
            .parse()
            .map_err(|e| format!("Invalid bind address: {e}"))
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            hostname: "0.0.0.0".to_string(),
            port: 8085,
            start: true,
            deployment_mode: false,
            static_root: "client".to_string(),
            manifest: "server/manifest.json".to_string(),
            access_log: true,
            access_log_file: None,
            error_log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let opts = Options::default();
        assert_eq!(opts.hostname, "0.0.0.0");
        assert_eq!(opts.port, 8085);
        assert!(opts.start);
        assert!(!opts.deployment_mode);
    }

    #[test]
    fn socket_addr_parses() {
        let opts = Options {
            hostname: "127.0.0.1".to_string(),
            port: 9000,
            ..Options::default()
        };
        assert_eq!(opts.socket_addr().unwrap().port(), 9000);
    }

    #[test]
    fn socket_addr_rejects_bad_hostname() {
        let opts = Options {
            hostname: "not a host".to_string(),
            ..Options::default()
        };
        assert!(opts.socket_addr().is_err());
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let opts = Options::load_from("definitely-missing-config").unwrap();
        assert_eq!(opts.port, 8085);
        assert_eq!(opts.static_root, "client");
        assert!(opts.access_log);
        assert!(opts.access_log_file.is_none());
    }
}
