//! ServiceBlueprint - Config Loader output
//!
//! Describes a complete deployment: listener, request deadline, slot
//! template and the providers backing it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{ContentConfig, Provider};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Full service configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-request settings
    #[serde(default)]
    pub request: RequestConfig,

    /// Repeating slot template (order is significant)
    pub slots: Vec<ContentConfig>,

    /// Provider definitions
    pub providers: Vec<ProviderSpec>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on, `host:port`
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Grace period for in-flight requests on shutdown
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    15
}

/// Per-request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Deadline for a whole request, both rounds included
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound on `count + offset` for a single request
    #[serde(default = "default_max_window")]
    pub max_window: usize,
}

impl RequestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_window: default_max_window(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Default upper bound on `count + offset`
pub const DEFAULT_MAX_WINDOW: usize = 10_000;

fn default_max_window() -> usize {
    DEFAULT_MAX_WINDOW
}

/// Provider definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Identifier used by slots and as the item `Source`
    pub id: Provider,

    /// Built-in implementation backing this provider
    #[serde(default)]
    pub kind: ProviderKind,

    /// Artificial latency added to every fetch
    #[serde(default)]
    pub latency_ms: u64,
}

impl ProviderSpec {
    pub fn sample(id: impl Into<Provider>) -> Self {
        Self {
            id: id.into(),
            kind: ProviderKind::Sample,
            latency_ms: 0,
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Built-in provider implementations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Generates as many items as requested
    #[default]
    Sample,
    /// Fails every fetch
    Unavailable,
}

impl Default for ServiceBlueprint {
    /// Built-in deployment: three sample providers behind a four-slot template.
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            server: ServerConfig::default(),
            request: RequestConfig::default(),
            slots: vec![
                ContentConfig::with_fallback("1", "2"),
                ContentConfig::with_fallback("1", "3"),
                ContentConfig::with_fallback("2", "3"),
                ContentConfig::with_fallback("3", "1"),
            ],
            providers: vec![
                ProviderSpec::sample("1"),
                ProviderSpec::sample("2"),
                ProviderSpec::sample("3"),
            ],
        }
    }
}
