//! ABI encoding of call data

use ethrpc_crypto::keccak256;
use ethrpc_primitives::{strip_hex_prefix, Address, U256};

use super::types::{I256, ParamType, Token};
use crate::SdkError;

/// Encode tokens according to the Solidity ABI head/tail layout
pub fn encode(tokens: &[Token]) -> Result<Vec<u8>, SdkError> {
    let types: Vec<ParamType> = tokens.iter().map(Token::type_of).collect();
    encode_params(&types, tokens)
}

/// Encode function call (selector + params)
pub fn encode_function_call(selector: [u8; 4], tokens: &[Token]) -> Result<Vec<u8>, SdkError> {
    let mut result = selector.to_vec();
    result.extend(encode(tokens)?);
    Ok(result)
}

/// Call data for `signature` applied to `args`, as `0x`-prefixed hex
///
/// With no arguments this is just the selector. The argument count is not
/// checked against the signature.
pub fn encode_call_data(signature: &str, args: &[Token]) -> Result<String, SdkError> {
    let selector = function_selector(signature);
    if args.is_empty() {
        return Ok(format!("0x{}", hex::encode(selector)));
    }
    Ok(format!("0x{}", hex::encode(encode_function_call(selector, args)?)))
}

/// Compute function selector from a canonical signature
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

fn encode_params(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, SdkError> {
    if types.len() != tokens.len() {
        return Err(SdkError::AbiEncode(format!(
            "expected {} values, got {}",
            types.len(),
            tokens.len()
        )));
    }

    let head_size = types.iter().map(head_length).sum::<usize>();

    let mut head = Vec::new();
    let mut tail = Vec::new();

    for (param_type, token) in types.iter().zip(tokens) {
        if param_type.is_dynamic() {
            let offset = head_size + tail.len();
            head.extend(encode_u256(&U256::from(offset)));
            tail.extend(encode_token(param_type, token)?);
        } else {
            head.extend(encode_token(param_type, token)?);
        }
    }

    head.extend(tail);
    Ok(head)
}

fn head_length(param_type: &ParamType) -> usize {
    match param_type {
        ParamType::FixedArray(inner, size) if !inner.is_dynamic() => head_length(inner) * size,
        ParamType::Tuple(types) if !types.iter().any(ParamType::is_dynamic) => {
            types.iter().map(head_length).sum()
        }
        _ => 32,
    }
}

fn encode_token(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, SdkError> {
    let encoded = match (param_type, token) {
        (ParamType::Address, Token::Address(addr)) => {
            let mut buf = [0u8; 32];
            buf[12..].copy_from_slice(addr.as_bytes());
            buf.to_vec()
        }
        (ParamType::Uint(_), Token::Uint(value)) => encode_u256(value),
        (ParamType::Int(_), Token::Int(value)) => encode_i256(value),
        (ParamType::Bool, Token::Bool(b)) => encode_u256(&U256::from(u8::from(*b))),
        (ParamType::FixedBytes(size), Token::FixedBytes(data)) => {
            if *size == 0 || *size > 32 || data.len() > *size {
                return Err(SdkError::AbiEncode(format!(
                    "{} bytes do not fit bytes{size}",
                    data.len()
                )));
            }
            let mut buf = [0u8; 32];
            buf[..data.len()].copy_from_slice(data);
            buf.to_vec()
        }
        (ParamType::Bytes, Token::Bytes(data)) => encode_bytes(data),
        (ParamType::String, Token::String(s)) => encode_bytes(s.as_bytes()),
        (ParamType::Array(inner), Token::Array(tokens)) => {
            let mut result = encode_u256(&U256::from(tokens.len()));
            let inner_types = vec![(**inner).clone(); tokens.len()];
            result.extend(encode_params(&inner_types, tokens)?);
            result
        }
        (ParamType::FixedArray(inner, size), Token::FixedArray(tokens)) if tokens.len() == *size => {
            let inner_types = vec![(**inner).clone(); tokens.len()];
            encode_params(&inner_types, tokens)?
        }
        (ParamType::Tuple(types), Token::Tuple(tokens)) => encode_params(types, tokens)?,
        _ => {
            return Err(SdkError::AbiEncode(format!(
                "value {token:?} does not match type {param_type:?}"
            )))
        }
    };
    Ok(encoded)
}

fn encode_u256(value: &U256) -> Vec<u8> {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes.to_vec()
}

/// Two's complement over 256 bits
fn encode_i256(value: &I256) -> Vec<u8> {
    if value.negative {
        encode_u256(&(!value.abs).overflowing_add(U256::one()).0)
    } else {
        encode_u256(&value.abs)
    }
}

fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = encode_u256(&U256::from(data.len()));

    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);

    result
}

/// Parse a type string (e.g. `uint256`, `address`, `bytes32[]`)
pub fn parse_type(s: &str) -> Result<ParamType, SdkError> {
    let s = s.trim();

    if let Some(inner) = s.strip_suffix("[]") {
        return Ok(ParamType::Array(Box::new(parse_type(inner)?)));
    }
    if let Some(open) = s.strip_suffix(']').and_then(|rest| rest.rfind('[')) {
        let size: usize = s[open + 1..s.len() - 1]
            .parse()
            .map_err(|_| SdkError::AbiEncode(format!("Invalid array size: {s}")))?;
        return Ok(ParamType::FixedArray(Box::new(parse_type(&s[..open])?), size));
    }

    match s {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("uint") {
        return Ok(ParamType::Uint(parse_bits(rest)?));
    }
    if let Some(rest) = s.strip_prefix("int") {
        return Ok(ParamType::Int(parse_bits(rest)?));
    }
    if let Some(rest) = s.strip_prefix("bytes") {
        let size: usize = rest
            .parse()
            .map_err(|_| SdkError::AbiEncode(format!("Invalid bytes size: {rest}")))?;
        if !(1..=32).contains(&size) {
            return Err(SdkError::AbiEncode(format!("Invalid bytes size: {rest}")));
        }
        return Ok(ParamType::FixedBytes(size));
    }

    Err(SdkError::AbiEncode(format!("Unknown type: {s}")))
}

fn parse_bits(rest: &str) -> Result<usize, SdkError> {
    if rest.is_empty() {
        return Ok(256);
    }
    let bits: usize = rest
        .parse()
        .map_err(|_| SdkError::AbiEncode(format!("Invalid integer size: {rest}")))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(SdkError::AbiEncode(format!("Invalid integer size: {rest}")));
    }
    Ok(bits)
}

/// Parse the textual form of a value of `param_type`
///
/// Integers are decimal or `0x` hex, byte types are hex, arrays are
/// `[a,b,c]` with comma-separated elements.
pub fn parse_token(param_type: &ParamType, value: &str) -> Result<Token, SdkError> {
    let value = value.trim();
    let token = match param_type {
        ParamType::Address => Token::Address(Address::from_hex(value)?),
        ParamType::Uint(_) => Token::Uint(parse_u256(value)?),
        ParamType::Int(_) => match value.strip_prefix('-') {
            Some(abs) => Token::Int(I256::new(parse_u256(abs)?, true)),
            None => Token::Int(I256::new(parse_u256(value)?, false)),
        },
        ParamType::Bool => match value {
            "true" | "1" => Token::Bool(true),
            "false" | "0" => Token::Bool(false),
            _ => return Err(SdkError::AbiEncode(format!("Invalid bool: {value}"))),
        },
        ParamType::String => Token::String(value.to_string()),
        ParamType::Bytes => Token::Bytes(hex::decode(strip_hex_prefix(value))?),
        ParamType::FixedBytes(size) => {
            let data = hex::decode(strip_hex_prefix(value))?;
            if data.len() > *size {
                return Err(SdkError::AbiEncode(format!(
                    "{} bytes do not fit bytes{size}",
                    data.len()
                )));
            }
            Token::FixedBytes(data)
        }
        ParamType::Array(inner) => Token::Array(parse_list(inner, value)?),
        ParamType::FixedArray(inner, size) => {
            let tokens = parse_list(inner, value)?;
            if tokens.len() != *size {
                return Err(SdkError::AbiEncode(format!(
                    "expected {size} elements, got {}",
                    tokens.len()
                )));
            }
            Token::FixedArray(tokens)
        }
        ParamType::Tuple(_) => {
            return Err(SdkError::AbiEncode("tuple values cannot be parsed from text".into()))
        }
    };
    Ok(token)
}

fn parse_list(inner: &ParamType, value: &str) -> Result<Vec<Token>, SdkError> {
    let body = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or_else(|| SdkError::AbiEncode(format!("Expected [..] list: {value}")))?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    body.split(',').map(|item| parse_token(inner, item)).collect()
}

fn parse_u256(value: &str) -> Result<U256, SdkError> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_dec_str(value).ok(),
    };
    parsed.ok_or_else(|| SdkError::AbiEncode(format!("Invalid integer: {value}")))
}
