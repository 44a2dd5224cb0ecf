use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use ideaforge_client::DEFAULT_ENDPOINT;
use ideaforge_logging::LogOptions;
use ideaforge_providers::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// IdeaForge runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Chat-completion gateway credential
    pub api_key: Option<String>,
    /// Chat-completion gateway base URL
    pub gateway_url: String,
    /// Model name sent upstream
    pub model: String,
    /// Relay endpoint used by `generate` and `session`
    pub endpoint: String,
    /// Public key sent as `apikey` / bearer to hosted relays
    pub anon_key: Option<String>,
    /// Log level
    pub log_level: String,
    /// JSON console logs
    pub log_json: bool,
    /// Directory for rolling log files
    pub log_dir: Option<PathBuf>,
    pub connect_timeout_secs: u64,
    pub stream_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            api_key: None,
            gateway_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            anon_key: None,
            log_level: "info".to_string(),
            log_json: false,
            log_dir: None,
            connect_timeout_secs: 10,
            stream_timeout_secs: 300,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        Self {
            bind_address: var("IDEAFORGE_BIND").unwrap_or(defaults.bind_address),
            port: var("IDEAFORGE_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            api_key: non_empty("AI_GATEWAY_API_KEY"),
            gateway_url: non_empty("AI_GATEWAY_URL").unwrap_or(defaults.gateway_url),
            model: non_empty("AI_GATEWAY_MODEL").unwrap_or(defaults.model),
            endpoint: non_empty("IDEAFORGE_ENDPOINT").unwrap_or(defaults.endpoint),
            anon_key: non_empty("IDEAFORGE_ANON_KEY"),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            log_json: var("IDEAFORGE_LOG_JSON")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_json),
            log_dir: non_empty("IDEAFORGE_LOG_DIR").map(PathBuf::from),
            connect_timeout_secs: var("IDEAFORGE_CONNECT_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.connect_timeout_secs),
            stream_timeout_secs: var("IDEAFORGE_STREAM_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.stream_timeout_secs),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            level: self.log_level.clone(),
            json: self.log_json,
            log_dir: self.log_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.gateway_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.stream_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("IDEAFORGE_PORT", "9090"),
            ("AI_GATEWAY_API_KEY", "secret"),
            ("AI_GATEWAY_MODEL", "other/model"),
            ("IDEAFORGE_CONNECT_TIMEOUT_SECS", "3"),
            ("IDEAFORGE_LOG_JSON", "true"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, "other/model");
        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
        assert!(config.log_options().json);
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = Config::from_lookup(lookup(&[
            ("AI_GATEWAY_API_KEY", "  "),
            ("IDEAFORGE_PORT", "not-a-port"),
        ]));
        assert!(config.api_key.is_none());
        assert_eq!(config.port, 8080);
    }
}
