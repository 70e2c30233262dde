//! Application configuration loaded from environment variables.

use transport::{TransportConfig, TransportError};
use url::Url;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3005`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `RUNTIME_URL` — workflow runtime base URL (default: `"http://127.0.0.1:8080"`)
/// - `PAYMENT_URL` — payment adapter base URL (default: `"http://localhost:3000"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub runtime_url: String,
    pub payment_url: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3005),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            runtime_url: std::env::var("RUNTIME_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
            payment_url: std::env::var("PAYMENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the backend base URLs into a transport configuration.
    pub fn transport(&self) -> Result<TransportConfig, TransportError> {
        Ok(TransportConfig {
            runtime_base: parse_base(&self.runtime_url)?,
            payment_base: parse_base(&self.payment_url)?,
        })
    }
}

fn parse_base(raw: &str) -> Result<Url, TransportError> {
    Url::parse(raw).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3005,
            log_level: "info".to_string(),
            runtime_url: "http://127.0.0.1:8080".to_string(),
            payment_url: "http://localhost:3000".to_string(),
        }
    }
}
