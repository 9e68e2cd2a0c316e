//! ABI decoding errors

use thiserror::Error;

/// Longest stream snapshot kept in an error message, in hex characters
const SNAPSHOT_LEN: usize = 256;

/// Failure of one decode call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AbiError {
    /// Type string matches no recognized form
    #[error("unsupported type `{ty}` (remaining stream: {remaining})")]
    UnsupportedType {
        /// Offending type string
        ty: String,
        /// Undecoded remainder at the time of the failure (truncated)
        remaining: String,
    },

    /// A length or offset points past the data, or a numeric field is not hex
    #[error("malformed stream: {0}")]
    MalformedStream(String),

    /// Array of dynamic elements, nested array or tuple
    #[error("unsupported type combination `{0}`")]
    UnsupportedCombination(String),
}

impl AbiError {
    pub(crate) fn unsupported_type(ty: &str, remaining: &str) -> Self {
        let remaining = if remaining.len() > SNAPSHOT_LEN {
            format!("{}...", &remaining[..SNAPSHOT_LEN])
        } else {
            remaining.to_string()
        };
        AbiError::UnsupportedType {
            ty: ty.to_string(),
            remaining,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        AbiError::MalformedStream(msg.into())
    }
}
