//! CLI configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use ethrpc_sdk::{ClientConfig, DEFAULT_GAS_LIMIT};

use crate::CliError;

/// CLI configuration, stored as TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint URL
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Chain ID used for transaction signing
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// Default gas limit
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: None,
            gas_limit: default_gas_limit(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".ethrpc"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Settings handed to the SDK client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            default_gas_limit: self.gas_limit,
            chain_id: self.chain_id,
        }
    }
}

/// Config file to use: the explicit one, else the default location
pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    explicit
        .or_else(Config::config_path)
        .ok_or_else(|| CliError::Config("Cannot determine config path".to_string()))
}
