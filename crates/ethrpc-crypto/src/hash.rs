//! Keccak-256 hashing

use ethrpc_primitives::H256;
use sha3::{Digest, Keccak256};

/// Compute the Keccak-256 digest of `data`
pub fn keccak256(data: impl AsRef<[u8]>) -> H256 {
    let digest = Keccak256::digest(data.as_ref());
    H256::from_bytes(digest.into())
}
