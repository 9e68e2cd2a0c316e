//! secp256k1 ECDSA signing and address derivation

use ethrpc_primitives::{Address, H256};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};

use crate::{keccak256, CryptoError};

/// Public key
pub type PublicKey = VerifyingKey;

/// Private key
pub type PrivateKey = SigningKey;

/// Recoverable ECDSA signature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r scalar
    pub r: [u8; 32],
    /// s scalar (always in the lower half of the curve order)
    pub s: [u8; 32],
    /// 27 or 28
    pub v: u8,
}

impl Signature {
    /// Recovery id (0 or 1)
    pub fn recovery_id(&self) -> u8 {
        if self.v >= 27 {
            self.v - 27
        } else {
            self.v
        }
    }

    /// 65-byte `r || s || v` form
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    fn to_k256(&self) -> Result<K256Signature, CryptoError> {
        K256Signature::from_scalars(self.r, self.s)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }
}

/// Sign a 32-byte message hash
///
/// High-s signatures are flipped to low-s (EIP-2) and the recovery id is
/// adjusted accordingly.
pub fn sign(message_hash: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (mut signature, mut recovery_id) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let (r, s) = signature.split_bytes();
    Ok(Signature {
        r: r.into(),
        s: s.into(),
        v: recovery_id.to_byte() + 27,
    })
}

/// Recover the signer's public key from a signature over `message_hash`
pub fn recover_public_key(
    message_hash: &H256,
    signature: &Signature,
) -> Result<PublicKey, CryptoError> {
    let recovery_id = RecoveryId::from_byte(signature.recovery_id())
        .ok_or(CryptoError::InvalidRecoveryId(signature.v))?;

    VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &signature.to_k256()?, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))
}

/// Address of a public key: last 20 bytes of keccak256 of the uncompressed point
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let point = public_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

/// Address controlled by a raw 32-byte private key
pub fn private_key_to_address(key: &[u8; 32]) -> Result<Address, CryptoError> {
    let signing_key = SigningKey::from_slice(key).map_err(|_| CryptoError::InvalidPrivateKey)?;
    Ok(public_key_to_address(signing_key.verifying_key()))
}
