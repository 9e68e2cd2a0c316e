//! Address checks

use clap::Subcommand;
use ethrpc_sdk::utils;

use crate::{output::Output, CliError};

/// Address subcommands
#[derive(Debug, Subcommand)]
pub enum AddressCommand {
    /// Check that an address is 0x + 40 hex digits and not zero
    Valid {
        /// Address to check
        address: String,
    },
    /// Check whether an address is the zero address
    Zero {
        /// Address to check
        address: String,
    },
}

impl AddressCommand {
    pub fn execute(self, json: bool) -> Result<(), CliError> {
        let (address, key, result) = match self {
            AddressCommand::Valid { address } => {
                let valid = utils::is_valid_address(&address);
                (address, "valid", valid)
            }
            AddressCommand::Zero { address } => {
                let zero = utils::is_zero_address(&address);
                (address, "zero", zero)
            }
        };

        Output::new(json)
            .field("address", &address)
            .field_bool(key, result)
            .message(&result.to_string())
            .print();
        Ok(())
    }
}
