//! Commands that talk to a node

use ethrpc_primitives::Address;
use ethrpc_sdk::types::{BlockId, CallParams};
use ethrpc_sdk::EthClient;
use tracing::debug;

use super::{abi::print_values, parse_args};
use crate::{config::Config, output::Output, CliError};

fn client(config: &Config) -> EthClient {
    debug!(url = %config.rpc_url, "connecting");
    EthClient::connect(&config.rpc_url, config.client_config())
}

/// `eth_call`, printing the raw result or the decoded values
pub async fn call(
    config: &Config,
    to: &str,
    signature: &str,
    args: &[String],
    block: &str,
    types: &[String],
    json: bool,
) -> Result<(), CliError> {
    let to = Address::from_hex(to).map_err(|e| CliError::InvalidAddress(e.to_string()))?;
    let block: BlockId = block.parse()?;
    let params = CallParams::new(to, signature)
        .args(parse_args(args)?)
        .block(block);

    let client = client(config);
    if types.is_empty() {
        let raw = client.call(&params).await?;
        Output::new(json).field("result", &raw).message(&raw).print();
        Ok(())
    } else {
        let values = client.call_decoded(&params, types).await?;
        print_values(&values, json)
    }
}

/// Print the latest block number
pub async fn block_number(config: &Config, json: bool) -> Result<(), CliError> {
    let number = client(config).block_number().await?;

    Output::new(json)
        .field_u64("block_number", number)
        .message(&format!("Block number: {}", number))
        .print();
    Ok(())
}

/// Print the current gas price
pub async fn gas_price(config: &Config, json: bool) -> Result<(), CliError> {
    let price = client(config).gas_price().await?;

    Output::new(json)
        .field_u128("gas_price_wei", price)
        .message(&format!("Gas price: {} wei", price))
        .print();
    Ok(())
}
