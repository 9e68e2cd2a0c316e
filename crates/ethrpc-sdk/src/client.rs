//! EthClient - JSON-RPC client for Ethereum nodes

use bytes::Bytes;
use ethrpc_primitives::{Address, H256};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::abi::{decode, encode_call_data, DecodedValue};
use crate::config::ClientConfig;
use crate::transport::{deserialize_response, MockTransport, RpcRequest, Transport};
use crate::tx_builder::TxBuilder;
use crate::types::{
    parse_hex_u128, parse_hex_u64, Block, BlockId, CallParams, CallRequest, Log,
    TransactionParams,
};
use crate::{SdkError, Wallet};

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Client for the `eth_*` JSON-RPC namespace
pub struct EthClient {
    transport: Box<dyn Transport>,
    config: ClientConfig,
}

impl EthClient {
    /// Create a new client with HTTP transport
    #[cfg(feature = "http")]
    pub fn connect(url: &str, config: ClientConfig) -> Self {
        Self::with_transport(HttpTransport::new(url), config)
    }

    /// Create a new client with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self::with_transport(MockTransport::new(), ClientConfig::default())
    }

    /// Create a client with a custom transport
    pub fn with_transport(transport: impl Transport + 'static, config: ClientConfig) -> Self {
        Self {
            transport: Box::new(transport),
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one request and return the raw `result`
    pub async fn rpc(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        debug!(method, "rpc request");
        self.transport.request_json(method, params).await
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, SdkError> {
        deserialize_response(self.rpc(method, params).await?)
    }

    // ==================== Contract Calls ====================

    /// Execute `eth_call`; returns the hex result as sent by the node
    pub async fn call(&self, params: &CallParams) -> Result<String, SdkError> {
        let data = encode_call_data(&params.method_signature, &params.args)?;
        let request = json!({
            "to": params.to.to_hex(),
            "data": data,
        });
        self.request("eth_call", vec![request, serde_json::to_value(params.block)?])
            .await
    }

    /// Execute `eth_call` and decode the result as `output_types`
    pub async fn call_decoded<S: AsRef<str>>(
        &self,
        params: &CallParams,
        output_types: &[S],
    ) -> Result<Vec<DecodedValue>, SdkError> {
        let raw = self.call(params).await?;
        Ok(decode(output_types, &raw)?)
    }

    /// Execute `eth_call` with a prepared call object
    pub async fn call_raw(&self, request: &CallRequest, block: BlockId) -> Result<String, SdkError> {
        self.request(
            "eth_call",
            vec![serde_json::to_value(request)?, serde_json::to_value(block)?],
        )
        .await
    }

    // ==================== Transactions ====================

    /// Sign `params` with `wallet`, submit it and return the transaction hash
    ///
    /// Nonce and gas price, when not given, are fetched concurrently.
    pub async fn transaction(
        &self,
        wallet: &Wallet,
        params: TransactionParams,
    ) -> Result<H256, SdkError> {
        let data = match (params.data, &params.method_signature) {
            (Some(data), _) => data,
            (None, Some(signature)) => call_data_bytes(signature, &params.args)?,
            (None, None) => {
                return Err(SdkError::MissingField(
                    "data or method_signature".to_string(),
                ))
            }
        };

        let (nonce, gas_price) = tokio::try_join!(
            async {
                match params.nonce {
                    Some(nonce) => Ok(nonce),
                    None => {
                        self.get_transaction_count(wallet.address(), BlockId::Latest)
                            .await
                    }
                }
            },
            async {
                match params.gas_price {
                    Some(price) => Ok(price),
                    None => self.gas_price().await,
                }
            },
        )?;

        let mut builder = TxBuilder::new()
            .nonce(nonce)
            .gas_price(gas_price)
            .gas_limit(params.gas_limit.unwrap_or(self.config.default_gas_limit))
            .value(params.value)
            .data(data);
        if let Some(to) = params.to {
            builder = builder.to(to);
        }
        if let Some(chain_id) = self.config.chain_id {
            builder = builder.chain_id(chain_id);
        }

        let signed = builder.sign(wallet)?;
        self.send_raw_transaction(&signed.rlp_bytes()).await
    }

    /// Submit RLP-encoded signed transaction bytes
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<H256, SdkError> {
        let hex = format!("0x{}", hex::encode(raw));
        let result: String = self
            .request("eth_sendRawTransaction", vec![Value::String(hex)])
            .await?;
        Ok(H256::from_hex(&result)?)
    }

    // ==================== Chain Queries ====================

    /// Current gas price in wei
    pub async fn gas_price(&self) -> Result<u128, SdkError> {
        let result: String = self.request("eth_gasPrice", vec![]).await?;
        parse_hex_u128(&result)
    }

    /// Code at `address` in the latest block, hex
    pub async fn get_code(&self, address: &Address) -> Result<String, SdkError> {
        self.request(
            "eth_getCode",
            vec![Value::String(address.to_hex()), serde_json::to_value(BlockId::Latest)?],
        )
        .await
    }

    /// Receipt of a mined transaction
    pub async fn get_transaction_receipt(&self, hash: &H256) -> Result<Value, SdkError> {
        self.rpc("eth_getTransactionReceipt", vec![Value::String(hash.to_hex())])
            .await
    }

    /// Number of transactions sent from `address`
    pub async fn get_transaction_count(
        &self,
        address: &Address,
        block: BlockId,
    ) -> Result<u64, SdkError> {
        let result: String = self
            .request(
                "eth_getTransactionCount",
                vec![Value::String(address.to_hex()), serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_u64(&result)
    }

    /// Number of the latest block
    pub async fn block_number(&self) -> Result<u64, SdkError> {
        let result: String = self.request("eth_blockNumber", vec![]).await?;
        parse_hex_u64(&result)
    }

    /// Block with hydrated transactions
    pub async fn get_block(&self, number: u64) -> Result<Block, SdkError> {
        self.request("eth_getBlockByNumber", block_params(number)).await
    }

    /// Logs of blocks `from..=to`
    pub async fn get_logs(&self, from: u64, to: u64) -> Result<Vec<Log>, SdkError> {
        self.request("eth_getLogs", vec![log_filter(from, to)]).await
    }

    /// Blocks `from..to` with their logs, fetched in one batch
    ///
    /// Every log goes to the block at `log.block_number - from`; its block
    /// hash has to match that block.
    pub async fn get_blocks(&self, from: u64, to: u64) -> Result<Vec<Block>, SdkError> {
        if to <= from {
            return Ok(Vec::new());
        }

        let mut batch: Vec<RpcRequest> = (from..to)
            .map(|number| RpcRequest::new("eth_getBlockByNumber", block_params(number)))
            .collect();
        batch.push(RpcRequest::new("eth_getLogs", vec![log_filter(from, to - 1)]));

        let mut responses = self.transport.request_batch(batch).await?;
        let logs: Vec<Log> = match responses.pop() {
            Some(logs) => deserialize_response(logs)?,
            None => return Err(SdkError::Reconcile("empty batch response".to_string())),
        };
        let mut blocks = responses
            .into_iter()
            .map(deserialize_response::<Block>)
            .collect::<Result<Vec<_>, _>>()?;

        attach_logs(&mut blocks, from, logs)?;
        Ok(blocks)
    }

    /// The given blocks, each with its own logs, fetched in one batch
    pub async fn get_blocks_from_array(&self, numbers: &[u64]) -> Result<Vec<Block>, SdkError> {
        let batch: Vec<RpcRequest> = numbers
            .iter()
            .flat_map(|&number| {
                [
                    RpcRequest::new("eth_getBlockByNumber", block_params(number)),
                    RpcRequest::new("eth_getLogs", vec![log_filter(number, number)]),
                ]
            })
            .collect();

        let responses = self.transport.request_batch(batch).await?;
        if responses.len() != numbers.len() * 2 {
            return Err(SdkError::Reconcile(format!(
                "expected {} responses, got {}",
                numbers.len() * 2,
                responses.len()
            )));
        }

        let mut responses = responses.into_iter();
        let mut blocks = Vec::with_capacity(numbers.len());
        while let (Some(block), Some(logs)) = (responses.next(), responses.next()) {
            let mut block: Block = deserialize_response(block)?;
            block.logs = deserialize_response(logs)?;
            blocks.push(block);
        }
        Ok(blocks)
    }
}

fn call_data_bytes(signature: &str, args: &[crate::abi::Token]) -> Result<Bytes, SdkError> {
    let data = encode_call_data(signature, args)?;
    Ok(Bytes::from(hex::decode(data.trim_start_matches("0x"))?))
}

fn block_params(number: u64) -> Vec<Value> {
    vec![Value::String(format!("0x{:x}", number)), Value::Bool(true)]
}

fn log_filter(from: u64, to: u64) -> Value {
    json!({
        "fromBlock": format!("0x{:x}", from),
        "toBlock": format!("0x{:x}", to),
    })
}

/// Append each log to the block it names
fn attach_logs(blocks: &mut [Block], from: u64, logs: Vec<Log>) -> Result<(), SdkError> {
    for log in logs {
        let block = log
            .block_number
            .checked_sub(from)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| blocks.get_mut(index));

        let Some(block) = block else {
            warn!(block_number = log.block_number, "log outside of requested range");
            return Err(SdkError::Reconcile(format!(
                "log of block {} is outside of the requested range",
                log.block_number
            )));
        };

        if log.block_hash != block.hash {
            warn!(block_number = log.block_number, "log block hash mismatch");
            return Err(SdkError::Reconcile(format!(
                "Log block hash ({}) differs from block hash ({})",
                log.block_hash, block.hash
            )));
        }

        block.logs.push(log);
    }
    Ok(())
}
