//! ABI value types

use std::fmt;

use ethrpc_primitives::{Address, H256, U256};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Value handed to the forward (call data) encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple
    Tuple(Vec<Token>),
}

/// Signed 256-bit integer stored as sign and magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I256 {
    /// Absolute value
    pub abs: U256,
    /// True if negative
    pub negative: bool,
}

impl I256 {
    /// Create from magnitude and sign; a zero magnitude is never negative
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            abs,
            negative: negative && !abs.is_zero(),
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

impl From<i128> for I256 {
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}

/// Parameter types understood by the forward encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Boolean
    Bool,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Check if this type is encoded in the tail
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(types) => types.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }
}

impl Token {
    /// Create a uint256 from u128
    pub fn uint(value: u128) -> Self {
        Token::Uint(U256::from(value))
    }

    /// Create an int256 from i128
    pub fn int(value: i128) -> Self {
        Token::Int(I256::from_i128(value))
    }

    /// Create a string token
    pub fn string(s: impl Into<String>) -> Self {
        Token::String(s.into())
    }

    /// Create a bytes32 token
    pub fn bytes32(data: H256) -> Self {
        Token::FixedBytes(data.as_bytes().to_vec())
    }

    /// Type this token encodes as
    pub fn type_of(&self) -> ParamType {
        match self {
            Token::Address(_) => ParamType::Address,
            Token::Uint(_) => ParamType::Uint(256),
            Token::Int(_) => ParamType::Int(256),
            Token::Bool(_) => ParamType::Bool,
            Token::Bytes(_) => ParamType::Bytes,
            Token::FixedBytes(b) => ParamType::FixedBytes(b.len()),
            Token::String(_) => ParamType::String,
            Token::Array(tokens) => {
                let inner = tokens.first().map(Token::type_of).unwrap_or(ParamType::Uint(256));
                ParamType::Array(Box::new(inner))
            }
            Token::FixedArray(tokens) => {
                let inner = tokens.first().map(Token::type_of).unwrap_or(ParamType::Uint(256));
                ParamType::FixedArray(Box::new(inner), tokens.len())
            }
            Token::Tuple(tokens) => ParamType::Tuple(tokens.iter().map(Token::type_of).collect()),
        }
    }
}

/// One decoded return value
///
/// Output of [`decode`](super::decode): one entry per requested type, same
/// order. Arrays hold elements of a single non-array variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    /// `intN`
    Int(I256),
    /// `uintN`
    Uint(U256),
    /// `bool`
    Bool(bool),
    /// `address`
    Address(Address),
    /// `string`
    String(String),
    /// `bytes` and `bytesN`
    Bytes(Vec<u8>),
    /// Any supported `T[]`
    Array(Vec<DecodedValue>),
}

impl DecodedValue {
    /// Elements if this is an array
    pub fn as_array(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Inner string if this is a `string`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Inner address if this is an `address`
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            DecodedValue::Address(addr) => Some(addr),
            _ => None,
        }
    }

    /// Inner flag if this is a `bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Int(v) => write!(f, "{v}"),
            DecodedValue::Uint(v) => write!(f, "{v}"),
            DecodedValue::Bool(v) => write!(f, "{v}"),
            DecodedValue::Address(v) => write!(f, "{v}"),
            DecodedValue::String(v) => f.write_str(v),
            DecodedValue::Bytes(v) => write!(f, "0x{}", hex::encode(v)),
            DecodedValue::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Bool(v) => serializer.serialize_bool(*v),
            DecodedValue::String(v) => serializer.serialize_str(v),
            DecodedValue::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}
