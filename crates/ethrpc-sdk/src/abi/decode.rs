//! ABI decoding of `eth_call` return data
//!
//! The input is the hex text of the return data. Positions and lengths are
//! counted in hex characters: one word is 64 characters. Every dynamic value
//! owns a two-word head region (an offset word, then the length or element
//! count) followed by its payload, and the types are consumed strictly left
//! to right through a single [`RawStream`] cursor.

use ethrpc_primitives::{strip_hex_prefix, Address, U256, WORD_HEX_LEN};
use tracing::trace;

use super::classify::{classify, ClassifyError, TypeCategory};
use super::error::AbiError;
use super::types::{DecodedValue, I256};

/// Position of the length / element-count word inside a dynamic value
const LENGTH_OFFSET: usize = WORD_HEX_LEN;

/// Position where the payload of a dynamic value starts
const PAYLOAD_OFFSET: usize = 2 * WORD_HEX_LEN;

/// Undecoded remainder of a hex payload
///
/// A cheap copyable cursor; each decode step returns the advanced stream
/// instead of mutating shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStream<'a> {
    hex: &'a str,
    cursor: usize,
}

impl<'a> RawStream<'a> {
    /// Wrap a hex payload, with or without `0x`
    pub fn new(raw: &'a str) -> Result<Self, AbiError> {
        let hex = strip_hex_prefix(raw);
        if let Some(pos) = hex.bytes().position(|b| !b.is_ascii_hexdigit()) {
            return Err(AbiError::malformed(format!(
                "non-hex character at position {pos}"
            )));
        }
        Ok(Self { hex, cursor: 0 })
    }

    /// Hex characters consumed so far
    pub fn offset(&self) -> usize {
        self.cursor
    }

    /// Everything not consumed yet
    pub fn remaining(&self) -> &'a str {
        &self.hex[self.cursor..]
    }

    /// True once the whole payload has been consumed
    pub fn is_empty(&self) -> bool {
        self.cursor == self.hex.len()
    }

    /// `remaining()[start..end]`, failing if `end` runs past the data
    fn slice(&self, start: usize, end: usize) -> Result<&'a str, AbiError> {
        let remaining = self.remaining();
        if end > remaining.len() {
            return Err(AbiError::malformed(format!(
                "need {end} hex chars at offset {}, only {} left",
                self.cursor,
                remaining.len()
            )));
        }
        Ok(&remaining[start..end])
    }

    /// The word starting `at` characters past the cursor
    fn word(&self, at: usize) -> Result<&'a str, AbiError> {
        self.slice(at, checked_add(at, WORD_HEX_LEN)?)
    }

    /// Word at `at` read as a length or element count
    fn length(&self, at: usize) -> Result<usize, AbiError> {
        let value = decode_uint(self.word(at)?)?;
        if value > U256::from(u32::MAX) {
            return Err(AbiError::malformed(format!(
                "length {value} at offset {} is out of range",
                self.cursor + at
            )));
        }
        Ok(value.low_u64() as usize)
    }

    /// `end` rounded up to a word boundary, capped at the end of the data
    ///
    /// Padding after the final payload of a stream may be missing.
    fn padded_end(&self, end: usize) -> Result<usize, AbiError> {
        Ok(align_to_word(end)?.min(self.remaining().len()))
    }

    /// Stream advanced by `n` characters
    fn advance(self, n: usize) -> Result<Self, AbiError> {
        self.slice(0, n)?;
        Ok(Self {
            cursor: self.cursor + n,
            ..self
        })
    }
}

/// Decode `raw` as the sequence of `types`
///
/// The result has one value per type, in order. Decoding either yields every
/// value or fails; trailing data after the last value is ignored.
pub fn decode<S: AsRef<str>>(types: &[S], raw: &str) -> Result<Vec<DecodedValue>, AbiError> {
    let mut stream = RawStream::new(raw)?;
    let mut values = Vec::with_capacity(types.len());

    for ty in types {
        let (value, next) = decode_one(ty.as_ref(), stream)?;
        values.push(value);
        stream = next;
    }

    Ok(values)
}

/// Decode a single value of type `ty` at the front of `stream`
///
/// Returns the value and the stream advanced past it.
pub fn decode_one<'a>(
    ty: &str,
    stream: RawStream<'a>,
) -> Result<(DecodedValue, RawStream<'a>), AbiError> {
    let category = classify(ty).map_err(|e| match e {
        ClassifyError::Unsupported => AbiError::unsupported_type(ty, stream.remaining()),
        ClassifyError::DynamicElement => AbiError::UnsupportedCombination(ty.to_string()),
    })?;

    trace!(ty, offset = stream.offset(), "decoding value");

    let (value, consumed) = decode_category(category, &stream)?;
    Ok((value, stream.advance(consumed)?))
}

/// Decode one value; returns it with the number of hex characters it spans
fn decode_category(
    category: TypeCategory,
    stream: &RawStream<'_>,
) -> Result<(DecodedValue, usize), AbiError> {
    match category {
        TypeCategory::FixedBytes(size) => {
            let word = stream.word(0)?;
            Ok((DecodedValue::Bytes(decode_hex(&word[..size * 2])?), WORD_HEX_LEN))
        }
        TypeCategory::Bytes => {
            let (payload, consumed) = dynamic_payload(stream)?;
            Ok((DecodedValue::Bytes(decode_hex(payload)?), consumed))
        }
        TypeCategory::String => {
            let (payload, consumed) = dynamic_payload(stream)?;
            Ok((DecodedValue::String(decode_string(payload)?), consumed))
        }
        TypeCategory::Address => Ok((
            DecodedValue::Address(decode_address(stream.word(0)?)?),
            WORD_HEX_LEN,
        )),
        TypeCategory::Bool => Ok((DecodedValue::Bool(decode_bool(stream.word(0)?)?), WORD_HEX_LEN)),
        TypeCategory::Uint(_) => Ok((DecodedValue::Uint(decode_uint(stream.word(0)?)?), WORD_HEX_LEN)),
        TypeCategory::Int(_) => Ok((DecodedValue::Int(decode_int(stream.word(0)?)?), WORD_HEX_LEN)),
        TypeCategory::BoolArray => {
            word_array(stream, |word| decode_bool(word).map(DecodedValue::Bool))
        }
        TypeCategory::FixedBytesArray(size) => word_array(stream, |word| {
            decode_hex(&word[..size * 2]).map(DecodedValue::Bytes)
        }),
        TypeCategory::AddressArray => {
            word_array(stream, |word| decode_address(word).map(DecodedValue::Address))
        }
        TypeCategory::UintArray(_) => {
            word_array(stream, |word| decode_uint(word).map(DecodedValue::Uint))
        }
        TypeCategory::IntArray(_) => {
            word_array(stream, |word| decode_int(word).map(DecodedValue::Int))
        }
        TypeCategory::StringArray => string_array(stream),
    }
}

/// Payload of a `bytes`/`string` value and the 64-aligned span it occupies
fn dynamic_payload<'a>(stream: &RawStream<'a>) -> Result<(&'a str, usize), AbiError> {
    let len = stream.length(LENGTH_OFFSET)?;
    let end = checked_add(PAYLOAD_OFFSET, checked_mul(len, 2)?)?;
    let payload = stream.slice(PAYLOAD_OFFSET, end)?;
    Ok((payload, stream.padded_end(end)?))
}

/// `T[]` whose elements are one word each
fn word_array<F>(stream: &RawStream<'_>, decode_word: F) -> Result<(DecodedValue, usize), AbiError>
where
    F: Fn(&str) -> Result<DecodedValue, AbiError>,
{
    let count = stream.length(LENGTH_OFFSET)?;
    let end = checked_add(PAYLOAD_OFFSET, checked_mul(count, WORD_HEX_LEN)?)?;
    let elements = stream.slice(PAYLOAD_OFFSET, end)?;

    let values = (0..count)
        .map(|i| decode_word(&elements[i * WORD_HEX_LEN..(i + 1) * WORD_HEX_LEN]))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((DecodedValue::Array(values), end))
}

/// `string[]`: (length word, padded payload) pairs laid out back to back
fn string_array(stream: &RawStream<'_>) -> Result<(DecodedValue, usize), AbiError> {
    let count = stream.length(LENGTH_OFFSET)?;
    let mut strings = Vec::new();
    let mut at = PAYLOAD_OFFSET;

    for _ in 0..count {
        let len = stream.length(at)?;
        let start = checked_add(at, WORD_HEX_LEN)?;
        let end = checked_add(start, checked_mul(len, 2)?)?;
        let payload = stream.slice(start, end)?;
        strings.push(DecodedValue::String(decode_string(payload)?));

        at = stream.padded_end(end)?;
    }

    Ok((DecodedValue::Array(strings), at))
}

/// Decode a word as an unsigned integer
pub fn decode_uint(word: &str) -> Result<U256, AbiError> {
    U256::from_str_radix(word, 16)
        .map_err(|e| AbiError::malformed(format!("invalid integer word `{word}`: {e:?}")))
}

/// Decode a word as a signed integer
///
/// Any value above 2^128 - 1 is read as a negative 256-bit two's complement
/// number, whatever the declared width of the type.
pub fn decode_int(word: &str) -> Result<I256, AbiError> {
    let value = decode_uint(word)?;
    if value > U256::from(u128::MAX) {
        Ok(I256::new(!value + U256::one(), true))
    } else {
        Ok(I256::new(value, false))
    }
}

/// Decode a word as an address (its last 20 bytes)
pub fn decode_address(word: &str) -> Result<Address, AbiError> {
    if word.len() != WORD_HEX_LEN {
        return Err(AbiError::malformed(format!(
            "address word must be {WORD_HEX_LEN} hex chars, got {}",
            word.len()
        )));
    }
    Address::from_hex(&word[WORD_HEX_LEN - 40..])
        .map_err(|e| AbiError::malformed(format!("invalid address word: {e}")))
}

/// Decode a word as a boolean; any nonzero value is `true`
pub fn decode_bool(word: &str) -> Result<bool, AbiError> {
    Ok(!decode_uint(word)?.is_zero())
}

/// Decode a hex payload as UTF-8
pub fn decode_string(payload: &str) -> Result<String, AbiError> {
    String::from_utf8(decode_hex(payload)?)
        .map_err(|e| AbiError::malformed(format!("string payload is not UTF-8: {e}")))
}

fn decode_hex(payload: &str) -> Result<Vec<u8>, AbiError> {
    hex::decode(payload).map_err(|e| AbiError::malformed(format!("invalid hex payload: {e}")))
}

fn align_to_word(n: usize) -> Result<usize, AbiError> {
    checked_mul(n.div_ceil(WORD_HEX_LEN), WORD_HEX_LEN)
}

fn checked_add(a: usize, b: usize) -> Result<usize, AbiError> {
    a.checked_add(b)
        .ok_or_else(|| AbiError::malformed("offset overflow"))
}

fn checked_mul(a: usize, b: usize) -> Result<usize, AbiError> {
    a.checked_mul(b)
        .ok_or_else(|| AbiError::malformed("length overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(value: u64) -> String {
        format!("{value:064x}")
    }

    fn padded(bytes: &[u8]) -> String {
        let mut hex = hex::encode(bytes);
        let len = hex.len().div_ceil(WORD_HEX_LEN) * WORD_HEX_LEN;
        hex.extend(std::iter::repeat('0').take(len - hex.len()));
        hex
    }

    #[test]
    fn test_decode_negative_int32() {
        let raw = "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe";
        let values = decode(&["int32"], raw).unwrap();
        assert_eq!(values[0].to_string(), "-2");
    }

    #[test]
    fn test_decode_int_consumes_first_word_only() {
        let raw = format!(
            "{}{}",
            "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe",
            word(7)
        );
        let (value, rest) = decode_one("int32", RawStream::new(&raw).unwrap()).unwrap();
        assert_eq!(value, DecodedValue::Int(I256::from_i128(-2)));
        assert_eq!(rest.offset(), WORD_HEX_LEN);
        assert_eq!(rest.remaining(), word(7));
    }

    #[test]
    fn test_decode_int_sign_threshold() {
        let max_positive = format!("{:064x}", u128::MAX);
        assert_eq!(
            decode_int(&max_positive).unwrap().to_string(),
            "340282366920938463463374607431768211455"
        );

        let two_pow_128 = format!("{:0>64}", format!("1{}", "0".repeat(32)));
        let value = decode_int(&two_pow_128).unwrap();
        assert!(value.negative);
        assert!(value.to_string().starts_with('-'));
    }

    #[test]
    fn test_decode_uint_and_bool() {
        let raw = format!("{}{}{}", word(255), word(1), word(0));
        let values = decode(&["uint8", "bool", "bool"], &raw).unwrap();
        assert_eq!(values[0], DecodedValue::Uint(U256::from(255)));
        assert_eq!(values[1], DecodedValue::Bool(true));
        assert_eq!(values[2], DecodedValue::Bool(false));
    }

    #[test]
    fn test_decode_bool_any_nonzero() {
        assert!(decode_bool(&word(2)).unwrap());
    }

    #[test]
    fn test_decode_address() {
        let raw = "0000000000000000000000000ccaf8cb1c92aef64dd36ce1f3882d195180ad5c";
        let values = decode(&["address"], raw).unwrap();
        assert_eq!(
            values[0].to_string(),
            "0x0ccaf8cb1c92aef64dd36ce1f3882d195180ad5c"
        );
    }

    #[test]
    fn test_decode_fixed_bytes() {
        let raw = padded(&[0xde, 0xad, 0xbe, 0xef]);
        let values = decode(&["bytes4"], &raw).unwrap();
        assert_eq!(values[0], DecodedValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]));
    }

    #[test]
    fn test_decode_fixed_bytes_after_another_value() {
        let raw = format!("{}{}", word(9), padded(&[0xab, 0xcd]));
        let values = decode(&["uint256", "bytes2"], &raw).unwrap();
        assert_eq!(values[1], DecodedValue::Bytes(vec![0xab, 0xcd]));
    }

    #[test]
    fn test_decode_string() {
        let raw = format!("{}{}{}", word(32), word(5), padded(b"hello"));
        let values = decode(&["string"], &raw).unwrap();
        assert_eq!(values[0], DecodedValue::String("hello".into()));
    }

    #[test]
    fn test_decode_string_length_is_hex() {
        // 16 bytes: the length word reads 0x10
        let text = "sixteen bytes!!!";
        let raw = format!("{}{}{}", word(32), word(16), padded(text.as_bytes()));
        let (value, rest) = decode_one("string", RawStream::new(&raw).unwrap()).unwrap();
        assert_eq!(value, DecodedValue::String(text.into()));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_decode_empty_string_and_bytes() {
        let raw = format!("{}{}{}", word(32), word(0), word(42));
        let (value, rest) = decode_one("string", RawStream::new(&raw).unwrap()).unwrap();
        assert_eq!(value, DecodedValue::String(String::new()));
        assert_eq!(rest.offset(), PAYLOAD_OFFSET);

        let (value, rest) = decode_one("bytes", RawStream::new(&raw).unwrap()).unwrap();
        assert_eq!(value, DecodedValue::Bytes(vec![]));
        assert_eq!(decode_uint(rest.remaining()).unwrap(), U256::from(42));
    }

    #[test]
    fn test_decode_bytes_advances_to_word_boundary() {
        let data = [0x11u8; 33];
        let raw = format!("{}{}{}{}", word(32), word(33), padded(&data), word(7));
        let (value, rest) = decode_one("bytes", RawStream::new(&raw).unwrap()).unwrap();
        assert_eq!(value, DecodedValue::Bytes(data.to_vec()));
        assert_eq!(rest.offset(), PAYLOAD_OFFSET + 2 * WORD_HEX_LEN);
    }

    #[test]
    fn test_decode_unpadded_trailing_payload() {
        let raw = format!("{}{}{}", word(32), word(2), "6869");
        let (value, rest) = decode_one("string", RawStream::new(&raw).unwrap()).unwrap();
        assert_eq!(value, DecodedValue::String("hi".into()));
        assert!(rest.is_empty());

        let values = decode(&["bytes"], &raw).unwrap();
        assert_eq!(values[0], DecodedValue::Bytes(b"hi".to_vec()));
    }

    #[test]
    fn test_decode_unpadded_trailing_string_array() {
        let raw = format!("{}{}{}{}", word(32), word(1), word(2), "6869");
        let (value, rest) = decode_one("string[]", RawStream::new(&raw).unwrap()).unwrap();
        assert_eq!(value, DecodedValue::Array(vec![DecodedValue::String("hi".into())]));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_decode_unpadded_payload_then_missing_value() {
        let raw = format!("{}{}{}", word(32), word(2), "6869");
        assert!(matches!(
            decode(&["string", "uint256"], &raw),
            Err(AbiError::MalformedStream(_))
        ));
    }

    #[test]
    fn test_decode_word_arrays() {
        let raw = format!("{}{}{}{}", word(32), word(2), word(1), word(0));
        let values = decode(&["bool[]"], &raw).unwrap();
        assert_eq!(
            values[0],
            DecodedValue::Array(vec![DecodedValue::Bool(true), DecodedValue::Bool(false)])
        );

        let values = decode(&["uint16[]"], &raw).unwrap();
        assert_eq!(values[0].to_string(), "[1, 0]");
    }

    #[test]
    fn test_decode_empty_array() {
        let raw = format!("{}{}", word(32), word(0));
        let (value, rest) = decode_one("address[]", RawStream::new(&raw).unwrap()).unwrap();
        assert_eq!(value, DecodedValue::Array(vec![]));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_decode_fixed_bytes_array() {
        let raw = format!("{}{}{}{}", word(32), word(2), padded(&[1, 2]), padded(&[3, 4]));
        let values = decode(&["bytes2[]"], &raw).unwrap();
        assert_eq!(
            values[0],
            DecodedValue::Array(vec![
                DecodedValue::Bytes(vec![1, 2]),
                DecodedValue::Bytes(vec![3, 4])
            ])
        );
    }

    #[test]
    fn test_decode_string_array() {
        let long = "a string that is longer than thirty-two bytes";
        let raw = format!(
            "{}{}{}{}{}{}{}{}",
            word(32),
            word(3),
            word(2),
            padded(b"hi"),
            word(0),
            word(long.len() as u64),
            padded(long.as_bytes()),
            word(99)
        );
        let (value, rest) = decode_one("string[]", RawStream::new(&raw).unwrap()).unwrap();
        assert_eq!(
            value,
            DecodedValue::Array(vec![
                DecodedValue::String("hi".into()),
                DecodedValue::String(String::new()),
                DecodedValue::String(long.into()),
            ])
        );
        assert_eq!(rest.remaining(), word(99));
    }

    #[test]
    fn test_decode_unsupported_type() {
        let raw = word(1);
        match decode(&["fixed128x18"], &raw) {
            Err(AbiError::UnsupportedType { ty, remaining }) => {
                assert_eq!(ty, "fixed128x18");
                assert_eq!(remaining, raw);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_decode_unsupported_combination() {
        let raw = format!("{}{}", word(32), word(0));
        assert_eq!(
            decode(&["bytes[]"], &raw),
            Err(AbiError::UnsupportedCombination("bytes[]".into()))
        );
        assert!(matches!(
            decode(&["(uint256,string)"], &raw),
            Err(AbiError::UnsupportedCombination(_))
        ));
    }

    #[test]
    fn test_decode_truncated_word() {
        assert!(matches!(
            decode(&["uint256"], "00ff"),
            Err(AbiError::MalformedStream(_))
        ));
    }

    #[test]
    fn test_decode_length_past_end() {
        let raw = format!("{}{}{}", word(32), word(100), padded(b"short"));
        assert!(matches!(
            decode(&["string"], &raw),
            Err(AbiError::MalformedStream(_))
        ));

        let raw = format!("{}{}{}", word(32), word(5), word(1));
        assert!(matches!(
            decode(&["uint256[]"], &raw),
            Err(AbiError::MalformedStream(_))
        ));
    }

    #[test]
    fn test_decode_huge_length_rejected() {
        let raw = format!("{}{}", word(32), "f".repeat(WORD_HEX_LEN));
        assert!(matches!(
            decode(&["bytes"], &raw),
            Err(AbiError::MalformedStream(_))
        ));
    }

    #[test]
    fn test_decode_non_hex_stream() {
        assert!(matches!(
            decode(&["uint256"], "zz"),
            Err(AbiError::MalformedStream(_))
        ));
    }

    #[test]
    fn test_decode_accepts_prefix() {
        let raw = format!("0x{}", word(3));
        assert_eq!(decode(&["uint256"], &raw).unwrap()[0].to_string(), "3");
    }

    #[test]
    fn test_decode_no_types() {
        assert_eq!(decode::<&str>(&[], "").unwrap(), vec![]);
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let raw = format!("{}{}{}", word(32), word(2), padded(&[0xff, 0xfe]));
        assert!(matches!(
            decode(&["string"], &raw),
            Err(AbiError::MalformedStream(_))
        ));
    }
}
