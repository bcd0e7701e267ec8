// Path: crates/types/src/config/mod.rs

//! Shared configuration structures for the chain task bridge.
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the bridge between the VM and the chain-handling thread
/// (the `[bridge]` table of the node's configuration file).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Capacity of the task channel feeding the handling thread.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// OS thread name of the chain-handling thread.
    #[serde(default = "default_handler_thread_name")]
    pub handler_thread_name: String,
    /// Log hex-encoded task parameters at `trace` level. Off by default since
    /// parameters may carry contract payloads.
    #[serde(default)]
    pub log_params: bool,
}

fn default_channel_capacity() -> usize {
    1024
}
fn default_handler_thread_name() -> String {
    "chain-handler".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            handler_thread_name: default_handler_thread_name(),
            log_params: false,
        }
    }
}

impl BridgeConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // tokio's bounded mpsc panics on a zero capacity.
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel_capacity must be greater than zero".into(),
            ));
        }
        if self.handler_thread_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "handler_thread_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = BridgeConfig::from_toml_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = BridgeConfig::from_toml_str("channel_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "channel_capacity = 8\nhandler_thread_name = \"lvm-chain\"\nlog_params = true"
        )
        .unwrap();
        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(config.handler_thread_name, "lvm-chain");
        assert!(config.log_params);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = BridgeConfig::load("/nonexistent/bridge.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
