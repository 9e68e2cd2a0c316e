//! SDK types

use std::str::FromStr;

use bytes::Bytes;
use ethrpc_primitives::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::abi::Token;
use crate::utils::is_hex;
use crate::SdkError;

/// Block identifier for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    /// Block number
    Number(u64),
    /// Latest block
    #[default]
    Latest,
    /// Pending block (includes pending transactions)
    Pending,
    /// Earliest block (genesis)
    Earliest,
    /// Safe block
    Safe,
    /// Finalized block
    Finalized,
}

impl Serialize for BlockId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            BlockId::Number(n) => serializer.serialize_str(&format!("0x{:x}", n)),
            BlockId::Latest => serializer.serialize_str("latest"),
            BlockId::Pending => serializer.serialize_str("pending"),
            BlockId::Earliest => serializer.serialize_str("earliest"),
            BlockId::Safe => serializer.serialize_str("safe"),
            BlockId::Finalized => serializer.serialize_str("finalized"),
        }
    }
}

impl FromStr for BlockId {
    type Err = SdkError;

    /// Parse a block tag or a `0x`-prefixed hex block number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(BlockId::Latest),
            "pending" => Ok(BlockId::Pending),
            "earliest" => Ok(BlockId::Earliest),
            "safe" => Ok(BlockId::Safe),
            "finalized" => Ok(BlockId::Finalized),
            _ if s.starts_with("0x") && is_hex(s) => parse_hex_u64(s)
                .map(BlockId::Number)
                .map_err(|_| SdkError::InvalidBlockTag(s.to_string())),
            _ => Err(SdkError::InvalidBlockTag(s.to_string())),
        }
    }
}

impl From<u64> for BlockId {
    fn from(number: u64) -> Self {
        BlockId::Number(number)
    }
}

/// Call object of `eth_call`
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    /// Sender address
    pub from: Option<Address>,
    /// Recipient address
    pub to: Option<Address>,
    /// Input data
    pub data: Option<Bytes>,
}

impl Serialize for CallRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let count = [self.from.is_some(), self.to.is_some(), self.data.is_some()]
            .iter()
            .filter(|set| **set)
            .count();
        let mut map = serializer.serialize_map(Some(count))?;

        if let Some(from) = &self.from {
            map.serialize_entry("from", &from.to_hex())?;
        }
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &format!("0x{}", hex::encode(data)))?;
        }

        map.end()
    }
}

/// Read-only contract call
#[derive(Debug, Clone)]
pub struct CallParams {
    /// Contract address
    pub to: Address,
    /// Canonical signature, e.g. `balanceOf(address)`
    pub method_signature: String,
    /// Arguments
    pub args: Vec<Token>,
    /// Block the call runs against
    pub block: BlockId,
}

impl CallParams {
    /// Call `method_signature` on `to` without arguments at `latest`
    pub fn new(to: Address, method_signature: impl Into<String>) -> Self {
        Self {
            to,
            method_signature: method_signature.into(),
            args: Vec::new(),
            block: BlockId::Latest,
        }
    }

    /// Set the arguments
    pub fn args(mut self, args: Vec<Token>) -> Self {
        self.args = args;
        self
    }

    /// Set the block
    pub fn block(mut self, block: BlockId) -> Self {
        self.block = block;
        self
    }
}

/// Transaction to sign and submit
///
/// Unset `nonce` and `gas_price` are fetched from the node; an unset gas
/// limit falls back to the client's configured default.
#[derive(Debug, Clone, Default)]
pub struct TransactionParams {
    /// Recipient (None for contract creation)
    pub to: Option<Address>,
    /// Signature used to build call data when `data` is unset
    pub method_signature: Option<String>,
    /// Arguments for `method_signature`
    pub args: Vec<Token>,
    /// Explicit call data
    pub data: Option<Bytes>,
    /// Sender nonce
    pub nonce: Option<u64>,
    /// Value in wei
    pub value: U256,
    /// Gas limit
    pub gas_limit: Option<u64>,
    /// Gas price in wei
    pub gas_price: Option<u128>,
}

/// Event log as returned by `eth_getLogs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics
    #[serde(default)]
    pub topics: Vec<H256>,
    /// Non-indexed data, hex
    #[serde(default)]
    pub data: String,
    /// Block the log belongs to
    #[serde(with = "hex_quantity")]
    pub block_number: u64,
    /// Hash of that block
    pub block_hash: H256,
    /// Remaining members, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Block as returned by `eth_getBlockByNumber` with hydrated transactions
///
/// `number` and `timestamp` are parsed from hex. `logs` is filled in by the
/// batched block queries and is empty otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block number
    #[serde(with = "hex_quantity")]
    pub number: u64,
    /// Block hash
    pub hash: H256,
    /// Unix timestamp
    #[serde(with = "hex_quantity")]
    pub timestamp: u64,
    /// Transactions (objects, since hydration is requested)
    #[serde(default)]
    pub transactions: Vec<Value>,
    /// Logs emitted in this block
    #[serde(default)]
    pub logs: Vec<Log>,
    /// Remaining members, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `0x`-prefixed hex quantity <-> u64
mod hex_quantity {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{:x}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hex_u64(&s).map_err(de::Error::custom)
    }
}

pub(crate) fn parse_hex_u64(s: &str) -> Result<u64, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| SdkError::InvalidHex(e.to_string()))
}

pub(crate) fn parse_hex_u128(s: &str) -> Result<u128, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u128::from_str_radix(s, 16).map_err(|e| SdkError::InvalidHex(e.to_string()))
}
