//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use relay_core::RelayConfig;
use relay_runtime::ProviderKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// Inference client to run
    pub provider: ProviderKind,
    /// Bound on one inference call
    pub inference_timeout: Duration,
    /// Replaces the built-in persona when set
    pub system_prompt: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            provider: ProviderKind::Bedrock,
            inference_timeout: Duration::from_secs(60),
            system_prompt: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.trim().parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: format!("{raw:?}: {e}"),
            })?,
            None => defaults.bind_addr,
        };

        let provider = match get("RELAY_PROVIDER") {
            Some(raw) => raw.parse::<ProviderKind>().map_err(|e| ConfigError::Invalid {
                key: "RELAY_PROVIDER",
                reason: e.to_string(),
            })?,
            None => defaults.provider,
        };

        let inference_timeout = match get("INFERENCE_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "INFERENCE_TIMEOUT_SECS",
                        reason: format!("{raw:?} is not a positive number of seconds"),
                    });
                }
            },
            None => defaults.inference_timeout,
        };

        Ok(Self {
            bind_addr,
            provider,
            inference_timeout,
            system_prompt: get("SYSTEM_PROMPT"),
        })
    }

    /// Relay settings derived from this configuration
    pub fn relay_config(&self) -> RelayConfig {
        let defaults = RelayConfig::default();
        RelayConfig {
            system_prompt: self.system_prompt.clone().unwrap_or(defaults.system_prompt),
            timeout: self.inference_timeout,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        ServerConfig::from_lookup(|key| map.get(key).map(|v| (*v).to_owned()))
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:5000");
        assert_eq!(config.provider, ProviderKind::Bedrock);
        assert_eq!(config.inference_timeout, Duration::from_secs(60));
        assert!(config.system_prompt.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("RELAY_PROVIDER", "echo"),
            ("INFERENCE_TIMEOUT_SECS", "5"),
            ("SYSTEM_PROMPT", "Be brief."),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.provider, ProviderKind::Echo);

        let relay = config.relay_config();
        assert_eq!(relay.system_prompt, "Be brief.");
        assert_eq!(relay.timeout, Duration::from_secs(5));
        assert_eq!(relay.generation.max_tokens, 2000);
    }

    #[test]
    fn test_invalid_values() {
        assert!(from_pairs(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(from_pairs(&[("RELAY_PROVIDER", "ollama")]).is_err());

        let err = from_pairs(&[("INFERENCE_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("INFERENCE_TIMEOUT_SECS"));
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let config = from_pairs(&[("BIND_ADDR", ""), ("SYSTEM_PROMPT", "  ")]).unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert!(config.system_prompt.is_none());
    }
}
