//! Decoder integration tests
//!
//! The forward encoder serves as the oracle: values are encoded with
//! `abi::encode` and must decode back unchanged.

use ethrpc_sdk::abi::{self, AbiError, DecodedValue, Token, I256};
use ethrpc_sdk::{Address, U256};
use proptest::prelude::*;

fn encode_hex(tokens: &[Token]) -> String {
    hex::encode(abi::encode(tokens).unwrap())
}

fn word(value: u64) -> String {
    format!("{value:064x}")
}

fn padded_utf8(s: &str) -> String {
    let mut hex = hex::encode(s.as_bytes());
    while hex.len() % 64 != 0 {
        hex.push('0');
    }
    hex
}

fn uint_max(bits: usize) -> U256 {
    if bits == 256 {
        U256::MAX
    } else {
        (U256::one() << bits) - U256::one()
    }
}

fn int_bounds(bits: usize) -> (i128, i128) {
    if bits >= 128 {
        (i128::MIN, i128::MAX)
    } else {
        let max = (1i128 << (bits - 1)) - 1;
        (-max - 1, max)
    }
}

// ==================== Concrete Vectors ====================

#[test]
fn test_int32_minus_two() {
    let raw = "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe";
    let values = abi::decode(&["int32"], raw).unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].to_string(), "-2");
}

#[test]
fn test_int_threshold() {
    let raw = format!("{:064x}", u128::MAX);
    let values = abi::decode(&["int256"], &raw).unwrap();
    assert_eq!(values[0].to_string(), "340282366920938463463374607431768211455");

    let raw = format!("{:0>64}", format!("1{}", "0".repeat(32)));
    let values = abi::decode(&["int256"], &raw).unwrap();
    assert!(values[0].to_string().starts_with('-'));
}

#[test]
fn test_decode_is_idempotent() {
    let raw = encode_hex(&[
        Token::uint(7),
        Token::Bool(true),
        Token::Address(Address::from_bytes([0x11; 20])),
        Token::string("idempotent"),
    ]);
    let types = ["uint256", "bool", "address", "string"];

    let first = abi::decode(&types, &raw).unwrap();
    let second = abi::decode(&types, &raw).unwrap();
    assert_eq!(first, second);
}

// ==================== Round Trips ====================

#[test]
fn test_uint_every_width() {
    for bits in (8..=256).step_by(8) {
        let ty = format!("uint{bits}");
        for value in [U256::zero(), U256::one(), uint_max(bits)] {
            let raw = encode_hex(&[Token::Uint(value)]);
            let values = abi::decode(&[ty.as_str()], &raw).unwrap();
            assert_eq!(values, vec![DecodedValue::Uint(value)], "{ty}");
        }
    }
}

#[test]
fn test_int_every_width() {
    for bits in (8..=256).step_by(8) {
        let ty = format!("int{bits}");
        let (min, max) = int_bounds(bits);
        for value in [min, -1, 0, 1, max] {
            let raw = encode_hex(&[Token::int(value)]);
            let values = abi::decode(&[ty.as_str()], &raw).unwrap();
            assert_eq!(values, vec![DecodedValue::Int(I256::from_i128(value))], "{ty}");
        }
    }
}

#[test]
fn test_fixed_bytes_every_size() {
    for size in 1..=32usize {
        let ty = format!("bytes{size}");
        let data: Vec<u8> = (0..size as u8).map(|b| b.wrapping_mul(7).wrapping_add(1)).collect();
        // a leading value checks that bytesN reads at the cursor
        let raw = encode_hex(&[Token::uint(1), Token::FixedBytes(data.clone())]);

        let values = abi::decode(&["uint8", ty.as_str()], &raw).unwrap();
        assert_eq!(values[1], DecodedValue::Bytes(data), "{ty}");
    }
}

#[test]
fn test_scalar_sequence_with_trailing_string() {
    let owner = Address::from_hex("0x0ccaf8cb1c92aef64dd36ce1f3882d195180ad5c").unwrap();
    let raw = encode_hex(&[
        Token::Address(owner),
        Token::int(-42),
        Token::Bool(false),
        Token::string("The DAO"),
    ]);

    let values = abi::decode(&["address", "int64", "bool", "string"], &raw).unwrap();
    assert_eq!(values[0], DecodedValue::Address(owner));
    assert_eq!(values[1].to_string(), "-42");
    assert_eq!(values[2], DecodedValue::Bool(false));
    assert_eq!(values[3], DecodedValue::String("The DAO".into()));
}

#[test]
fn test_dynamic_bytes_round_trip() {
    for len in [0usize, 1, 31, 32, 33, 100] {
        let data = vec![0xabu8; len];
        let raw = encode_hex(&[Token::Bytes(data.clone())]);
        assert_eq!(abi::decode(&["bytes"], &raw).unwrap(), vec![DecodedValue::Bytes(data)]);
    }
}

#[test]
fn test_word_arrays_round_trip() {
    let addresses = vec![Address::from_bytes([1; 20]), Address::from_bytes([2; 20])];
    let raw = encode_hex(&[Token::Array(addresses.iter().copied().map(Token::Address).collect())]);
    assert_eq!(
        abi::decode(&["address[]"], &raw).unwrap(),
        vec![DecodedValue::Array(addresses.into_iter().map(DecodedValue::Address).collect())]
    );

    let raw = encode_hex(&[Token::Array(vec![Token::int(-1), Token::int(5)])]);
    assert_eq!(abi::decode(&["int8[]"], &raw).unwrap()[0].to_string(), "[-1, 5]");

    let raw = encode_hex(&[Token::Array(vec![Token::Bool(true), Token::Bool(false)])]);
    assert_eq!(abi::decode(&["bool[]"], &raw).unwrap()[0].to_string(), "[true, false]");

    let raw = encode_hex(&[Token::Array(vec![Token::uint(3)])]);
    assert_eq!(abi::decode(&["uint[]"], &raw).unwrap()[0].to_string(), "[3]");

    let raw = encode_hex(&[Token::Array(vec![
        Token::FixedBytes(vec![0xca, 0xfe]),
        Token::FixedBytes(vec![0xbe, 0xef]),
    ])]);
    assert_eq!(
        abi::decode(&["bytes2[]"], &raw).unwrap()[0].to_string(),
        "[0xcafe, 0xbeef]"
    );
}

#[test]
fn test_string_array_sequential_layout() {
    let raw = [
        word(32),
        word(2),
        word(3),
        padded_utf8("foo"),
        word(40),
        padded_utf8("a forty byte string, exactly forty bytes"),
    ]
    .concat();

    let values = abi::decode(&["string[]"], &raw).unwrap();
    assert_eq!(
        values[0],
        DecodedValue::Array(vec![
            DecodedValue::String("foo".into()),
            DecodedValue::String("a forty byte string, exactly forty bytes".into()),
        ])
    );
}

#[test]
fn test_value_after_array() {
    let raw = [word(32), word(1), word(9), word(1)].concat();
    let values = abi::decode(&["uint256[]", "bool"], &raw).unwrap();
    assert_eq!(values[0].to_string(), "[9]");
    assert_eq!(values[1], DecodedValue::Bool(true));
}

// ==================== Errors ====================

#[test]
fn test_unsupported_types() {
    for ty in ["fixed", "ufixed128x18", "function", "uint7", "bytes33", "int264"] {
        assert!(
            matches!(abi::decode(&[ty], &word(0)), Err(AbiError::UnsupportedType { .. })),
            "{ty}"
        );
    }
}

#[test]
fn test_unsupported_combinations() {
    for ty in ["bytes[]", "uint256[][]", "string[2]", "(bool,string)"] {
        assert!(
            matches!(
                abi::decode(&[ty], &word(0)),
                Err(AbiError::UnsupportedCombination(_))
            ),
            "{ty}"
        );
    }
}

#[test]
fn test_no_partial_results() {
    let raw = [word(1)].concat();
    assert!(matches!(
        abi::decode(&["uint256", "uint256"], &raw),
        Err(AbiError::MalformedStream(_))
    ));
}

// ==================== Properties ====================

proptest! {
    #[test]
    fn prop_uint_round_trip(bytes in 1usize..=32, value: u128) {
        let bits = bytes * 8;
        let value = if bits >= 128 { value } else { value & ((1u128 << bits) - 1) };
        let raw = encode_hex(&[Token::uint(value)]);
        let values = abi::decode(&[format!("uint{bits}")], &raw).unwrap();
        prop_assert_eq!(&values[0], &DecodedValue::Uint(U256::from(value)));
    }

    #[test]
    fn prop_int_round_trip(bytes in 1usize..=32, value: i128) {
        let bits = bytes * 8;
        let value = if bits >= 128 {
            value
        } else {
            let shift = 128 - bits as u32;
            (value << shift) >> shift
        };
        let raw = encode_hex(&[Token::int(value)]);
        let values = abi::decode(&[format!("int{bits}")], &raw).unwrap();
        prop_assert_eq!(values[0].to_string(), value.to_string());
    }

    #[test]
    fn prop_string_round_trip(s in "\\PC{0,80}") {
        let raw = encode_hex(&[Token::string(s.clone())]);
        let values = abi::decode(&["string"], &raw).unwrap();
        prop_assert_eq!(&values[0], &DecodedValue::String(s));
    }

    #[test]
    fn prop_garbage_never_panics(raw in "[0-9a-f]{0,400}", ty in "(uint256|string|bytes|bool\\[\\]|string\\[\\])") {
        let _ = abi::decode(&[ty], &raw);
    }
}
