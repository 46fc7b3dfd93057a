// Configuration module entry point
// Loads the process-wide configuration and holds the per-process application state

mod state;
mod types;

use std::env;
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    CaptchaConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig, Secret, ServerConfig,
    StoreConfig, UpstreamConfig, VotingConfig,
};

/// Environment variables kept for compatibility with existing deployments,
/// mapped onto their configuration keys
const LEGACY_ENV_KEYS: [(&str, &str); 4] = [
    ("MONGO_BASE_URL", "store.base_url"),
    ("MONGO_API_KEY", "store.api_key"),
    ("RECAPTCHA_SECRET", "captcha.secret"),
    ("VOTING_END_TIMESTAMP", "voting.end_timestamp"),
];

impl Config {
    /// Load configuration from specified file path (extension optional)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("VOTE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.max_body_size", 16_384)? // 16KB
            .set_default("http.client_ip_header", "cf-connecting-ip")?
            .set_default("store.database", "bentotec")?
            .set_default("store.collection", "projects")?
            .set_default("store.data_source", "Bentotec")?
            .set_default(
                "captcha.verify_url",
                "https://www.google.com/recaptcha/api/siteverify",
            )?
            .set_default("upstream.timeout_secs", 10)?;

        for (var, key) in LEGACY_ENV_KEYS {
            builder = builder.set_override_option(key, env::var(var).ok())?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
pub fn test_config(end_timestamp: i64) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: None,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            access_log: false,
            access_log_format: "combined".to_string(),
        },
        performance: PerformanceConfig {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        },
        http: HttpConfig {
            max_body_size: 1024,
            client_ip_header: "cf-connecting-ip".to_string(),
        },
        store: StoreConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: Secret::new("store-key"),
            database: "bentotec".to_string(),
            collection: "projects".to_string(),
            data_source: "Bentotec".to_string(),
        },
        captcha: CaptchaConfig {
            secret: Secret::new("captcha-secret"),
            verify_url: "http://127.0.0.1:9/siteverify".to_string(),
        },
        voting: VotingConfig { end_timestamp },
        upstream: UpstreamConfig { timeout_secs: 5 },
    }
}
