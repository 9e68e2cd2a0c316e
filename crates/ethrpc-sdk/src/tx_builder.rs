//! Legacy transaction building and signing

use bytes::Bytes;
use ethrpc_crypto::keccak256;
use ethrpc_primitives::{Address, H256, U256};
use rlp::RlpStream;

use crate::{SdkError, Wallet};

/// Transaction builder with fluent API
#[derive(Debug, Clone, Default)]
pub struct TxBuilder {
    chain_id: Option<u64>,
    nonce: Option<u64>,
    gas_limit: Option<u64>,
    gas_price: Option<u128>,
    to: Option<Address>,
    value: U256,
    data: Bytes,
}

impl TxBuilder {
    /// Create a new transaction builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign for `chain_id` (EIP-155)
    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Set the nonce
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Set the gas limit
    pub fn gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = Some(limit);
        self
    }

    /// Set the gas price
    pub fn gas_price(mut self, price: u128) -> Self {
        self.gas_price = Some(price);
        self
    }

    /// Set the recipient address
    pub fn to(mut self, address: Address) -> Self {
        self.to = Some(address);
        self
    }

    /// Set the value to transfer (in wei)
    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the input data
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// Build the unsigned transaction
    pub fn build(&self) -> Result<LegacyTx, SdkError> {
        let nonce = self.nonce.ok_or(SdkError::MissingField("nonce".to_string()))?;
        let gas_limit = self.gas_limit.ok_or(SdkError::MissingField("gas_limit".to_string()))?;
        let gas_price = self.gas_price.ok_or(SdkError::MissingField("gas_price".to_string()))?;

        Ok(LegacyTx {
            nonce,
            gas_price,
            gas_limit,
            to: self.to,
            value: self.value,
            data: self.data.clone(),
        })
    }

    /// Build and sign
    pub fn sign(&self, wallet: &Wallet) -> Result<SignedLegacyTx, SdkError> {
        self.build()?.sign(wallet, self.chain_id)
    }
}

/// Unsigned legacy (type 0) transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTx {
    /// Sender nonce
    pub nonce: u64,
    /// Gas price in wei
    pub gas_price: u128,
    /// Gas limit
    pub gas_limit: u64,
    /// Recipient (None for contract creation)
    pub to: Option<Address>,
    /// Value in wei
    pub value: U256,
    /// Input data
    pub data: Bytes,
}

impl LegacyTx {
    /// RLP payload that gets hashed and signed
    ///
    /// Six fields, plus `chain_id, 0, 0` under EIP-155.
    pub fn signing_payload(&self, chain_id: Option<u64>) -> Vec<u8> {
        let mut stream = RlpStream::new_list(if chain_id.is_some() { 9 } else { 6 });
        self.append_fields(&mut stream);
        if let Some(chain_id) = chain_id {
            stream.append(&chain_id);
            stream.append_empty_data();
            stream.append_empty_data();
        }
        stream.out().to_vec()
    }

    /// Keccak-256 of the signing payload
    pub fn signing_hash(&self, chain_id: Option<u64>) -> H256 {
        keccak256(self.signing_payload(chain_id))
    }

    /// Sign with `wallet`
    pub fn sign(self, wallet: &Wallet, chain_id: Option<u64>) -> Result<SignedLegacyTx, SdkError> {
        let signature = wallet.sign_hash(&self.signing_hash(chain_id))?;
        let recovery_id = u64::from(signature.recovery_id());

        let v = match chain_id {
            Some(chain_id) => chain_id
                .checked_mul(2)
                .and_then(|v| v.checked_add(35 + recovery_id))
                .ok_or_else(|| {
                    SdkError::SigningFailed(format!("chain id {chain_id} is too large for EIP-155"))
                })?,
            None => recovery_id + 27,
        };

        Ok(SignedLegacyTx {
            tx: self,
            v,
            r: U256::from_big_endian(&signature.r),
            s: U256::from_big_endian(&signature.s),
        })
    }

    fn append_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&U256::from(self.gas_price));
        stream.append(&self.gas_limit);
        match &self.to {
            Some(to) => stream.append(to),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value);
        stream.append(&self.data.to_vec());
    }
}

/// Signed legacy transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLegacyTx {
    /// Transaction fields
    pub tx: LegacyTx,
    /// Recovery value (27/28, or EIP-155 encoded)
    pub v: u64,
    /// Signature r
    pub r: U256,
    /// Signature s
    pub s: U256,
}

impl SignedLegacyTx {
    /// RLP encoding submitted with `eth_sendRawTransaction`
    pub fn rlp_bytes(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(9);
        self.tx.append_fields(&mut stream);
        stream.append(&self.v);
        stream.append(&self.r);
        stream.append(&self.s);
        stream.out().to_vec()
    }

    /// `0x`-prefixed hex of [`rlp_bytes`](Self::rlp_bytes)
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(self.rlp_bytes()))
    }

    /// Transaction hash
    pub fn hash(&self) -> H256 {
        keccak256(self.rlp_bytes())
    }
}
