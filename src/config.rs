use anyhow::{Context, Result};
use std::time::Duration;

use crate::services::openrouter::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when OPENROUTER_API_KEY is unset or empty
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
    /// Backend request timeout; unset means reqwest's default (no timeout)
    pub openrouter_timeout: Option<Duration>,
    pub host: String,
    pub port: u16,
    pub ping_message: String,
    pub static_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", port))?,
            None => 8080,
        };

        let openrouter_timeout = non_empty("OPENROUTER_TIMEOUT_SECS")
            .map(|secs| {
                secs.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| {
                        format!("OPENROUTER_TIMEOUT_SECS must be whole seconds, got '{}'", secs)
                    })
            })
            .transpose()?;

        Ok(Self {
            openrouter_api_key: non_empty("OPENROUTER_API_KEY"),
            openrouter_model: non_empty("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openrouter_base_url: non_empty("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openrouter_timeout,
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            ping_message: lookup("PING_MESSAGE").unwrap_or_else(|| "ping".to_string()),
            static_dir: non_empty("STATIC_DIR"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert!(config.openrouter_api_key.is_none());
        assert_eq!(config.openrouter_model, DEFAULT_MODEL);
        assert_eq!(config.openrouter_base_url, DEFAULT_BASE_URL);
        assert!(config.openrouter_timeout.is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.ping_message, "ping");
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("OPENROUTER_API_KEY", "sk-or-123"),
            ("OPENROUTER_MODEL", "openai/gpt-4o-mini"),
            ("OPENROUTER_TIMEOUT_SECS", "30"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("PING_MESSAGE", "pong"),
        ])
        .unwrap();

        assert_eq!(config.openrouter_api_key.as_deref(), Some("sk-or-123"));
        assert_eq!(config.openrouter_model, "openai/gpt-4o-mini");
        assert_eq!(config.openrouter_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.ping_message, "pong");
    }

    #[test]
    fn test_empty_api_key_counts_as_missing() {
        let config = config_from(&[("OPENROUTER_API_KEY", "  ")]).unwrap();
        assert!(config.openrouter_api_key.is_none());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
