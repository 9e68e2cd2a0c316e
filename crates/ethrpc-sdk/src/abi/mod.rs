//! Solidity ABI support
//!
//! - [`classify`] maps a type string onto one of the decodable categories
//! - [`decode`] turns the hex return data of `eth_call` into [`DecodedValue`]s
//! - [`encode_call_data`] builds call data from a signature and [`Token`]s

mod classify;
mod decode;
mod encode;
mod error;
mod types;

pub use classify::{classify, ClassifyError, TypeCategory};
pub use decode::{
    decode, decode_address, decode_bool, decode_int, decode_one, decode_string, decode_uint,
    RawStream,
};
pub use encode::{
    encode, encode_call_data, encode_function_call, function_selector, parse_token, parse_type,
};
pub use error::AbiError;
pub use types::{DecodedValue, I256, ParamType, Token};
