use std::path::PathBuf;

use shimmer_channels::{DEFAULT_MAX_BODY_BYTES, DEFAULT_WEBHOOK_PATH};

/// Shimmer process configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Log level, overridden by a parseable `RUST_LOG`
    pub log_level: String,
    /// Directory for rolling NDJSON logs; console only when unset
    pub log_dir: Option<PathBuf>,
    /// Settings YAML file
    pub settings_file: PathBuf,
    /// Route serving the Facebook webhook
    pub webhook_path: String,
    /// Largest accepted notification body, in bytes
    pub max_body_bytes: usize,
    /// Externally reachable base URL, used by `webhook-info`
    pub public_url: Option<String>,
    /// Queue capacity for asynchronous dispatch; dispatch is inline when unset
    pub dispatch_queue: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_dir: None,
            settings_file: shimmer_config::settings_file_path(&shimmer_config::config_dir()),
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            public_url: None,
            dispatch_queue: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_address: var("SHIMMER_BIND").unwrap_or(defaults.bind_address),
            port: var("SHIMMER_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: var("SHIMMER_LOG_DIR")
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
            settings_file: var("SHIMMER_SETTINGS_FILE")
                .filter(|f| !f.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_file),
            webhook_path: var("SHIMMER_WEBHOOK_PATH")
                .filter(|p| p.starts_with('/'))
                .unwrap_or(defaults.webhook_path),
            max_body_bytes: var("SHIMMER_MAX_BODY_BYTES")
                .and_then(|b| b.parse().ok())
                .filter(|b: &usize| *b > 0)
                .unwrap_or(defaults.max_body_bytes),
            public_url: var("SHIMMER_PUBLIC_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            dispatch_queue: var("SHIMMER_DISPATCH_QUEUE")
                .and_then(|c| c.parse().ok())
                .filter(|c: &usize| *c > 0),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Full webhook URL when a public base URL is known.
    pub fn webhook_url(&self) -> Option<String> {
        self.public_url
            .as_ref()
            .map(|base| format!("{base}{}", self.webhook_path))
    }
}
