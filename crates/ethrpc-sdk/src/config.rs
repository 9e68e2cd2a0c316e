//! Client configuration

use serde::{Deserialize, Serialize};

/// Gas limit used when a transaction does not name one
pub const DEFAULT_GAS_LIMIT: u64 = 0x6691b7;

/// Settings an [`EthClient`](crate::EthClient) applies to every transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Gas limit for transactions without an explicit one
    #[serde(default = "default_gas_limit")]
    pub default_gas_limit: u64,
    /// Chain id for EIP-155 signing; unsigned-chain (pre-EIP-155) when unset
    #[serde(default)]
    pub chain_id: Option<u64>,
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_gas_limit: DEFAULT_GAS_LIMIT,
            chain_id: None,
        }
    }
}

impl ClientConfig {
    /// Set the default gas limit
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.default_gas_limit = gas_limit;
        self
    }

    /// Set the chain id
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}
