//! Signing key management

use ethrpc_crypto::{public_key_to_address, sign, PrivateKey, Signature};
use ethrpc_primitives::{strip_hex_prefix, Address, H256};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::SdkError;

/// Holder of one secp256k1 private key
///
/// Not `Clone`: build a second wallet from the same key bytes if needed.
pub struct Wallet {
    private_key: PrivateKey,
    address: Address,
}

impl Wallet {
    /// Create a new random wallet
    pub fn new_random() -> Self {
        let private_key = SigningKey::random(&mut OsRng);
        let address = public_key_to_address(private_key.verifying_key());

        Self {
            private_key,
            address,
        }
    }

    /// Create a wallet from a 32-byte private key
    pub fn from_private_key(key: &[u8; 32]) -> Result<Self, SdkError> {
        let private_key = SigningKey::from_slice(key)
            .map_err(|e| SdkError::InvalidPrivateKey(e.to_string()))?;
        let address = public_key_to_address(private_key.verifying_key());

        Ok(Self {
            private_key,
            address,
        })
    }

    /// Create a wallet from a hex-encoded private key, with or without `0x`
    pub fn from_private_key_hex(hex: &str) -> Result<Self, SdkError> {
        let mut bytes = hex::decode(strip_hex_prefix(hex))
            .map_err(|e| SdkError::InvalidPrivateKey(e.to_string()))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(SdkError::InvalidPrivateKey(format!(
                "Expected 32 bytes, got {len}"
            )));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();

        let result = Self::from_private_key(&key);
        key.zeroize();
        result
    }

    /// Address derived from the key
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Sign a 32-byte hash
    pub fn sign_hash(&self, hash: &H256) -> Result<Signature, SdkError> {
        Ok(sign(hash, &self.private_key)?)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HARDHAT_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_random() {
        let wallet = Wallet::new_random();
        assert_ne!(wallet.address(), &Address::ZERO);
    }

    #[test]
    fn test_wallet_from_hex() {
        let wallet = Wallet::from_private_key_hex(&format!("0x{HARDHAT_KEY}")).unwrap();
        assert_eq!(
            wallet.address().to_hex(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_wallet_from_hex_no_prefix() {
        let wallet = Wallet::from_private_key_hex(HARDHAT_KEY).unwrap();
        assert_eq!(
            wallet.address().to_hex(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_wallet_invalid_key() {
        assert!(matches!(
            Wallet::from_private_key_hex("0x1234"),
            Err(SdkError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            Wallet::from_private_key_hex("not hex"),
            Err(SdkError::InvalidPrivateKey(_))
        ));
        assert!(Wallet::from_private_key(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_wallet_sign_hash() {
        let wallet = Wallet::from_private_key(&[0x42; 32]).unwrap();
        let signature = wallet.sign_hash(&H256::from_bytes([0x42; 32])).unwrap();

        assert_ne!(signature.r, [0u8; 32]);
        assert!(signature.v == 27 || signature.v == 28);
    }

    #[test]
    fn test_wallet_debug_hides_key() {
        let wallet = Wallet::from_private_key_hex(HARDHAT_KEY).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("address"));
        assert!(!debug.contains("private_key"));
        assert!(!debug.contains(HARDHAT_KEY));
    }
}
