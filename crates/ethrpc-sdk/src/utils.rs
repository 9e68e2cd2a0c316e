//! String checks for hex values and addresses
//!
//! All functions here are total: malformed input yields `false`.

use ethrpc_primitives::strip_hex_prefix;

/// Length of a `0x`-prefixed address string
const ADDRESS_STR_LEN: usize = 42;

/// True if `value` is a non-empty run of hex digits, with or without `0x`
pub fn is_hex(value: &str) -> bool {
    let digits = strip_hex_prefix(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// True if `address` is hex whose magnitude is zero
pub fn is_zero_address(address: &str) -> bool {
    let digits = strip_hex_prefix(address);
    is_hex(digits) && digits.bytes().all(|b| b == b'0')
}

/// True if `address` is `0x` plus 40 hex digits and not the zero address
///
/// Only a lowercase `0x` prefix is accepted here.
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(digits) => {
            address.len() == ADDRESS_STR_LEN
                && digits.bytes().all(|b| b.is_ascii_hexdigit())
                && !is_zero_address(digits)
        }
        None => false,
    }
}
