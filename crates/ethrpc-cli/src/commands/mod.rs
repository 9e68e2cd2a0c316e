//! Subcommand implementations

pub mod abi;
pub mod address;
pub mod query;

use ethrpc_sdk::abi::{parse_token, parse_type, Token};

use crate::CliError;

/// Parse `--arg type=value` pairs into tokens
pub fn parse_args(args: &[String]) -> Result<Vec<Token>, CliError> {
    args.iter()
        .map(|arg| {
            let (ty, value) = arg.split_once('=').ok_or_else(|| {
                CliError::InvalidInput(format!("Expected type=value, got: {arg}"))
            })?;
            Ok(parse_token(&parse_type(ty)?, value)?)
        })
        .collect()
}
