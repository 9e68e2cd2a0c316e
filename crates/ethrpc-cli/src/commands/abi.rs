//! Offline ABI commands

use ethrpc_sdk::abi;

use super::parse_args;
use crate::{output::Output, CliError};

/// Print the 4-byte selector of `signature`
pub fn selector(signature: &str, json: bool) -> Result<(), CliError> {
    let selector = format!("0x{}", hex::encode(abi::function_selector(signature)));

    Output::new(json)
        .field("signature", signature)
        .field("selector", &selector)
        .message(&selector)
        .print();
    Ok(())
}

/// Print call data for `signature` applied to `args`
pub fn calldata(signature: &str, args: &[String], json: bool) -> Result<(), CliError> {
    let tokens = parse_args(args)?;
    let data = abi::encode_call_data(signature, &tokens)?;

    Output::new(json)
        .field("signature", signature)
        .field("data", &data)
        .message(&data)
        .print();
    Ok(())
}

/// Decode `data` as `types` and print one value per line
pub fn decode(types: &[String], data: &str, json: bool) -> Result<(), CliError> {
    let values = abi::decode(types, data)?;
    print_values(&values, json)
}

pub(crate) fn print_values(values: &[abi::DecodedValue], json: bool) -> Result<(), CliError> {
    let lines: Vec<String> = values.iter().map(ToString::to_string).collect();

    Output::new(json)
        .field_value("values", serde_json::to_value(values)?)
        .message(&lines.join("\n"))
        .print();
    Ok(())
}
