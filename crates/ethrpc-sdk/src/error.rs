//! SDK error types

use thiserror::Error;

use crate::abi::AbiError;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// Transport/network error
    #[error("Transport error: {0}")]
    Transport(String),

    /// RPC error from node
    #[error("RPC error: {code} - {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Decoding of return data failed
    #[error("ABI decoding error: {0}")]
    Abi(#[from] AbiError),

    /// Call data could not be encoded
    #[error("ABI encoding error: {0}")]
    AbiEncode(String),

    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Block tag is neither a known tag nor a hex number
    #[error("Expected hex, got: {0}")]
    InvalidBlockTag(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Blocks and logs of one batch do not line up
    #[error("Error during fetch of logs: {0}")]
    Reconcile(String),
}

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<ethrpc_crypto::CryptoError> for SdkError {
    fn from(e: ethrpc_crypto::CryptoError) -> Self {
        SdkError::SigningFailed(e.to_string())
    }
}

impl From<ethrpc_primitives::PrimitiveError> for SdkError {
    fn from(e: ethrpc_primitives::PrimitiveError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}

impl From<ethrpc_primitives::AddressError> for SdkError {
    fn from(e: ethrpc_primitives::AddressError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}

impl From<ethrpc_primitives::HashError> for SdkError {
    fn from(e: ethrpc_primitives::HashError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}
