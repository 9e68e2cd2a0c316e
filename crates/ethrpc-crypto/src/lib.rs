//! # ethrpc-crypto
//!
//! Cryptographic primitives used by the eth-rpc client.
//!
//! - Keccak-256 hashing (method selectors, transaction hashes)
//! - ECDSA signing over secp256k1 with low-s normalization
//! - Public key recovery
//! - Private key to address derivation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::CryptoError;
pub use hash::keccak256;
pub use signature::{
    private_key_to_address, public_key_to_address, recover_public_key, sign, PrivateKey,
    PublicKey, Signature,
};
