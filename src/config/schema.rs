//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the development server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory to serve. Must exist and be a directory.
    pub root: PathBuf,

    /// Enable the reload channel and inject the reload script into HTML.
    pub reload: bool,

    /// Fallback document (relative to `root`) for extensionless routes.
    /// Empty disables single-page-application mode.
    pub fallback: String,

    /// Regular expressions; matching paths never receive the fallback document.
    pub ignores: Vec<String>,

    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Optional TLS configuration. Presence switches the transport to HTTPS.
    pub tls: Option<TlsConfig>,

    /// Reload channel behavior.
    pub reload_channel: ReloadChannelConfig,

    /// File-system watching of the root.
    pub watch: WatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            reload: false,
            fallback: String::new(),
            ignores: Vec::new(),
            listener: ListenerConfig::default(),
            tls: None,
            reload_channel: ReloadChannelConfig::default(),
            watch: WatchConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a configuration serving `root` with everything else defaulted.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Whether single-page-application mode is active.
    pub fn has_fallback(&self) -> bool {
        !self.fallback.is_empty()
    }

    /// URL scheme implied by the transport.
    pub fn scheme(&self) -> &'static str {
        if self.tls.is_some() {
            "https"
        } else {
            "http"
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "127.0.0.1").
    pub host: String,

    /// Port to bind. 0 selects an ephemeral port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ListenerConfig {
    /// "host:port" string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

/// How a single trigger is delivered to pending subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPolicy {
    /// Notify and close every pending subscriber.
    #[default]
    Broadcast,
    /// Notify and close only the most recently added subscriber.
    Lifo,
}

/// Reload channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadChannelConfig {
    /// Delivery policy for `trigger`.
    pub delivery: DeliveryPolicy,

    /// Interval of keep-alive comments on open subscriptions in seconds (0 = off).
    pub heartbeat_secs: u64,
}

impl Default for ReloadChannelConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryPolicy::Broadcast,
            heartbeat_secs: 0,
        }
    }
}

/// File watcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Watch the root and trigger a reload on change.
    /// `None` follows the top-level `reload` flag.
    pub enabled: Option<bool>,

    /// Quiet period collapsing bursts of file events into one reload.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            debounce_ms: 100,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Paint access log statuses. `None` detects a terminal on stdout.
    pub color: Option<bool>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            color: None,
        }
    }
}
