//! # ethrpc-primitives
//!
//! Fixed-width value types shared by the eth-rpc crates.
//!
//! `U256` is re-exported from `primitive-types`; `Address` and `H256` are
//! thin byte-array newtypes with `0x` hex parsing and formatting.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};

pub use primitive_types::U256;

/// Block number type
pub type BlockNumber = u64;

/// Transaction nonce type
pub type Nonce = u64;

/// Number of hex characters in one 32-byte ABI word
pub const WORD_HEX_LEN: usize = 64;

/// Strip an optional `0x`/`0X` prefix
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
