//! CLI error types

use ethrpc_sdk::abi::AbiError;
use ethrpc_sdk::SdkError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// SDK error
    #[error("{0}")]
    Sdk(#[from] SdkError),

    /// Return data could not be decoded
    #[error("ABI decoding error: {0}")]
    Abi(#[from] AbiError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}
