//! Contract interface helpers
//!
//! [`ContractAbi`] reads the JSON interface description emitted by `solc`
//! and answers which output types a method returns, so that raw `eth_call`
//! results can be decoded without spelling the types out by hand.

use ethrpc_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::abi::{decode, DecodedValue, Token};
use crate::types::{BlockId, CallParams};
use crate::{EthClient, SdkError};

/// One parameter of an ABI entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    /// Parameter name (may be empty)
    #[serde(default)]
    pub name: String,
    /// Canonical type string
    #[serde(rename = "type")]
    pub ty: String,
}

/// One entry (function, event, constructor, ...) of a contract ABI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEntry {
    /// Entry name; absent for constructors and fallbacks
    #[serde(default)]
    pub name: Option<String>,
    /// Entry kind (`function`, `event`, ...)
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Inputs
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    /// Outputs
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
}

impl AbiEntry {
    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        let inputs: Vec<&str> = self.inputs.iter().map(|p| p.ty.as_str()).collect();
        Some(format!("{}({})", name, inputs.join(",")))
    }
}

/// Parsed contract ABI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAbi {
    entries: Vec<AbiEntry>,
}

impl ContractAbi {
    /// Parse ABI JSON (an array of entries)
    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build from entries
    pub fn new(entries: Vec<AbiEntry>) -> Self {
        Self { entries }
    }

    /// All entries in declaration order
    pub fn entries(&self) -> &[AbiEntry] {
        &self.entries
    }

    /// Output types of every entry named like `method`
    ///
    /// `method` may be a bare name or a full signature; only the part before
    /// `(` is compared. Overloads are concatenated in declaration order.
    pub fn method_output_types(&self, method: &str) -> Vec<String> {
        let name = method.split('(').next().unwrap_or(method);
        self.entries
            .iter()
            .filter(|entry| entry.name.as_deref() == Some(name))
            .flat_map(|entry| entry.outputs.iter().map(|output| output.ty.clone()))
            .collect()
    }

    /// Decode raw call output as `types`
    pub fn decode_raw_output<S: AsRef<str>>(
        &self,
        types: &[S],
        raw: &str,
    ) -> Result<Vec<DecodedValue>, SdkError> {
        Ok(decode(types, raw)?)
    }
}

/// A deployed contract: address plus interface
#[derive(Debug, Clone)]
pub struct Contract {
    address: Address,
    abi: ContractAbi,
}

impl Contract {
    /// Create a new contract handle
    pub fn new(address: Address, abi: ContractAbi) -> Self {
        Self { address, abi }
    }

    /// Get the contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the interface
    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    /// Call `signature` at `latest` and decode the declared outputs
    pub async fn call(
        &self,
        client: &EthClient,
        signature: &str,
        args: Vec<Token>,
    ) -> Result<Vec<DecodedValue>, SdkError> {
        let types = self.abi.method_output_types(signature);
        let params = CallParams::new(self.address, signature)
            .args(args)
            .block(BlockId::Latest);
        client.call_decoded(&params, &types).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAO_ABI: &str = r#"[
        {"type": "function", "name": "id", "inputs": [], "outputs": [{"name": "", "type": "uint256"}]},
        {"type": "function", "name": "getDAOById", "inputs": [{"name": "id", "type": "bytes32"}],
         "outputs": [{"name": "name", "type": "string"}, {"name": "owner", "type": "address"}]},
        {"type": "function", "name": "getDAOById", "inputs": [{"name": "id", "type": "uint256"}],
         "outputs": [{"name": "active", "type": "bool"}]},
        {"type": "constructor", "inputs": []},
        {"type": "event", "name": "Created", "inputs": [{"name": "id", "type": "bytes32"}]}
    ]"#;

    #[test]
    fn test_parse_abi() {
        let abi = ContractAbi::from_json(DAO_ABI).unwrap();
        assert_eq!(abi.entries().len(), 5);
        assert_eq!(abi.entries()[1].signature().unwrap(), "getDAOById(bytes32)");
        assert_eq!(abi.entries()[3].signature(), None);
    }

    #[test]
    fn test_method_output_types() {
        let abi = ContractAbi::from_json(DAO_ABI).unwrap();
        assert_eq!(abi.method_output_types("id()"), vec!["uint256"]);
        assert_eq!(abi.method_output_types("id"), vec!["uint256"]);
    }

    #[test]
    fn test_method_output_types_overloads() {
        let abi = ContractAbi::from_json(DAO_ABI).unwrap();
        assert_eq!(
            abi.method_output_types("getDAOById(bytes32)"),
            vec!["string", "address", "bool"]
        );
        assert!(abi.method_output_types("missing()").is_empty());
        assert!(abi.method_output_types("Created").is_empty());
    }

    #[test]
    fn test_decode_raw_output() {
        let abi = ContractAbi::from_json(DAO_ABI).unwrap();
        let raw = format!("0x{:064x}", 42);
        let values = abi
            .decode_raw_output(&abi.method_output_types("id"), &raw)
            .unwrap();
        assert_eq!(values[0].to_string(), "42");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ContractAbi::from_json("{not json"),
            Err(SdkError::Serialization(_))
        ));
    }
}
