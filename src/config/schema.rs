//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Deployment environment; selects the `baseUrls_<environment>` entry.
    pub environment: EnvironmentConfig,

    /// Where routes, exclusions and backend credentials are loaded from.
    pub config_source: ConfigSourceConfig,

    /// Bearer token settings.
    pub auth: AuthConfig,

    /// Operator endpoint settings.
    pub operator: OperatorConfig,

    /// Cache refresh schedule.
    pub refresh: RefreshConfig,

    /// Outbound forwarding behavior.
    pub forwarding: ForwardingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Environment name, e.g. "development" or "production".
    pub name: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: "development".to_string(),
        }
    }
}

/// Which [`ConfigSource`](crate::source::ConfigSource) implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Remote property service over HTTP.
    Http,
    /// Local TOML file, re-read on every fetch.
    File,
}

/// Configuration source settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigSourceConfig {
    pub kind: SourceKind,

    /// Owner name whose entries drive the gateway.
    pub owner: String,

    /// Base URL of the property service (`kind = "http"`).
    pub url: String,

    /// Basic auth username for the property service.
    pub username: Option<String>,

    /// Basic auth password for the property service.
    pub password: Option<String>,

    /// Path to the entries file (`kind = "file"`).
    pub path: String,

    /// Property service request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ConfigSourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Http,
            owner: "app_authgateway".to_string(),
            url: "http://localhost:8080/authenv-service/env-props".to_string(),
            username: None,
            password: None,
            path: "gateway-entries.toml".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Bearer token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret shared with the token issuer.
    pub secret_key: String,

    /// Lifetime of issued tokens in hours.
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            token_ttl_hours: 24,
        }
    }
}

/// Operator endpoint configuration.
///
/// When both credentials are set, the reset endpoint requires HTTP basic auth.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OperatorConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Cache refresh schedule.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Local wall-clock checkpoints ("HH:MM:SS") at which the cache is reset.
    pub checkpoints: Vec<String>,

    /// How often the scheduler checks the clock, in milliseconds (max 1000).
    pub poll_interval_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            checkpoints: vec![
                "00:00:01".to_string(),
                "06:00:01".to_string(),
                "12:00:01".to_string(),
                "18:00:01".to_string(),
            ],
            poll_interval_ms: 1000,
        }
    }
}

/// Outbound forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Relay backend 4xx/5xx responses as-is. When false they become 502.
    pub relay_backend_errors: bool,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            relay_backend_errors: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
