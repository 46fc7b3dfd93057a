// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::fmt;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub store: StoreConfig,
    pub captcha: CaptchaConfig,
    pub voting: VotingConfig,
    pub upstream: UpstreamConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub max_body_size: u64,
    /// Header set by the fronting proxy with the caller's IP
    pub client_ip_header: String,
}

/// Remote document store (Data API) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: Secret,
    pub database: String,
    pub collection: String,
    pub data_source: String,
}

/// Captcha verification configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CaptchaConfig {
    pub secret: Secret,
    pub verify_url: String,
}

/// Voting window configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VotingConfig {
    /// End of the voting window, seconds since epoch
    pub end_timestamp: i64,
}

/// Outbound HTTP client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub timeout_secs: u64,
}

/// Credential value that never shows up in `Debug` output
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    #[cfg(test)]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}
