//! # ethrpc-sdk
//!
//! Client library for Ethereum JSON-RPC nodes.
//!
//! ## Features
//!
//! - **abi**: type classification, decoding of `eth_call` return data,
//!   selector and call data encoding
//! - **utils**: hex and address checks
//! - **EthClient**: typed `eth_*` calls, transaction submission and batched
//!   block/log queries over any [`Transport`]
//! - **Wallet** / **TxBuilder**: key handling and legacy transaction signing
//! - **contract**: ABI JSON parsing and decoding by method name
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ethrpc_sdk::abi::{self, Token};
//! use ethrpc_sdk::types::CallParams;
//! use ethrpc_sdk::{Address, ClientConfig, EthClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EthClient::connect("http://localhost:8545", ClientConfig::default());
//!
//!     let token = Address::from_hex("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")?;
//!     let owner = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d")?;
//!
//!     let params = CallParams::new(token, "balanceOf(address)").args(vec![Token::Address(owner)]);
//!     let raw = client.call(&params).await?;
//!
//!     let values = abi::decode(&["uint256"], &raw)?;
//!     println!("Balance: {}", values[0]);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
mod client;
mod config;
pub mod contract;
mod error;
mod transport;
mod tx_builder;
pub mod types;
pub mod utils;
mod wallet;

pub use client::EthClient;
pub use config::{ClientConfig, DEFAULT_GAS_LIMIT};
pub use error::SdkError;
pub use transport::{MockTransport, RpcRequest};

/// Re-export Transport trait for custom implementations
pub use transport::Transport;
pub use tx_builder::{LegacyTx, SignedLegacyTx, TxBuilder};
pub use wallet::Wallet;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Re-export primitives for convenience
pub use ethrpc_primitives::{Address, BlockNumber, Nonce, H256, U256};
