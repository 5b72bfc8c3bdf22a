//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the URL
//! loader service. All types derive Serde traits for deserialization from
//! config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the loader service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LoaderConfig {
    /// Listener configuration for the service boundary.
    pub listener: ListenerConfig,

    /// Host rewrite rules, applied before any network attempt.
    pub rewrite: Vec<RewriteRule>,

    /// Redirect-following settings.
    pub redirect: RedirectConfig,

    /// HTTPS capability.
    pub https: HttpsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:7780").
    pub bind_address: String,

    /// Maximum concurrent bindings (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:7780".to_string(),
            max_connections: 1_024,
        }
    }
}

/// A host rewrite rule: requests for `host` are sent to the replacement
/// target instead. First exact match wins.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewriteRule {
    /// Host to match (exact, case-sensitive).
    pub host: String,

    /// Replacement host.
    pub to_host: String,

    /// Replacement port.
    pub to_port: String,

    /// Replacement scheme ("http" or "https").
    pub to_scheme: String,
}

/// Redirect-following configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Maximum redirect hops before the load fails.
    pub max_hops: u32,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self { max_hops: 20 }
    }
}

/// HTTPS capability. When disabled, `https` URLs are downgraded to
/// plaintext with the port normalized to 80.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpsConfig {
    pub enabled: bool,
}

impl Default for HttpsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { connect_secs: 5 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
