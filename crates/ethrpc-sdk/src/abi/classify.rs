//! Type string classification
//!
//! Maps an ABI type string to the strategy the decoder uses for it. Only
//! scalars and single-level dynamic arrays of a scalar are recognized; arrays
//! of dynamic elements other than `string[]`, nested arrays, fixed-length
//! arrays and tuples are rejected.

use std::fmt;

/// Decoding strategy for one type string
///
/// Variants are listed in classification precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// `bytes1`..`bytes32`
    FixedBytes(usize),
    /// `bytes`
    Bytes,
    /// `string`
    String,
    /// `address`
    Address,
    /// `bool`
    Bool,
    /// `uint8`..`uint256`
    Uint(usize),
    /// `int8`..`int256`
    Int(usize),
    /// `bool[]`
    BoolArray,
    /// `bytesN[]`
    FixedBytesArray(usize),
    /// `string[]`
    StringArray,
    /// `address[]`
    AddressArray,
    /// `uintN[]`
    UintArray(usize),
    /// `intN[]`
    IntArray(usize),
}

/// Why a type string could not be classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyError {
    /// Matches no recognized form
    Unsupported,
    /// An aggregate whose elements are dynamic, nested or mixed
    DynamicElement,
}

impl TypeCategory {
    /// True if the value is reached through the two-word head region
    pub fn is_dynamic(&self) -> bool {
        !matches!(
            self,
            TypeCategory::FixedBytes(_)
                | TypeCategory::Address
                | TypeCategory::Bool
                | TypeCategory::Uint(_)
                | TypeCategory::Int(_)
        )
    }

    /// True for the `T[]` categories
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            TypeCategory::BoolArray
                | TypeCategory::FixedBytesArray(_)
                | TypeCategory::StringArray
                | TypeCategory::AddressArray
                | TypeCategory::UintArray(_)
                | TypeCategory::IntArray(_)
        )
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCategory::FixedBytes(n) => write!(f, "bytes{n}"),
            TypeCategory::Bytes => f.write_str("bytes"),
            TypeCategory::String => f.write_str("string"),
            TypeCategory::Address => f.write_str("address"),
            TypeCategory::Bool => f.write_str("bool"),
            TypeCategory::Uint(bits) => write!(f, "uint{bits}"),
            TypeCategory::Int(bits) => write!(f, "int{bits}"),
            TypeCategory::BoolArray => f.write_str("bool[]"),
            TypeCategory::FixedBytesArray(n) => write!(f, "bytes{n}[]"),
            TypeCategory::StringArray => f.write_str("string[]"),
            TypeCategory::AddressArray => f.write_str("address[]"),
            TypeCategory::UintArray(bits) => write!(f, "uint{bits}[]"),
            TypeCategory::IntArray(bits) => write!(f, "int{bits}[]"),
        }
    }
}

/// Classify an ABI type string
pub fn classify(ty: &str) -> Result<TypeCategory, ClassifyError> {
    if ty.starts_with('(') {
        return Err(ClassifyError::DynamicElement);
    }

    if let Some(category) = classify_scalar(ty) {
        return Ok(category);
    }

    if let Some(element) = ty.strip_suffix("[]") {
        return match classify_scalar(element) {
            Some(TypeCategory::Bool) => Ok(TypeCategory::BoolArray),
            Some(TypeCategory::FixedBytes(n)) => Ok(TypeCategory::FixedBytesArray(n)),
            Some(TypeCategory::String) => Ok(TypeCategory::StringArray),
            Some(TypeCategory::Address) => Ok(TypeCategory::AddressArray),
            Some(TypeCategory::Uint(bits)) => Ok(TypeCategory::UintArray(bits)),
            Some(TypeCategory::Int(bits)) => Ok(TypeCategory::IntArray(bits)),
            Some(_) => Err(ClassifyError::DynamicElement),
            None if element.ends_with(']') || element.starts_with('(') => {
                Err(ClassifyError::DynamicElement)
            }
            None => Err(ClassifyError::Unsupported),
        };
    }

    // T[k]
    if let Some((element, _)) = ty.split_once('[') {
        if element.starts_with('(') || matches!(element, "bytes" | "string") {
            return Err(ClassifyError::DynamicElement);
        }
    }

    Err(ClassifyError::Unsupported)
}

fn classify_scalar(ty: &str) -> Option<TypeCategory> {
    match ty {
        "bytes" => return Some(TypeCategory::Bytes),
        "string" => return Some(TypeCategory::String),
        "address" => return Some(TypeCategory::Address),
        "bool" => return Some(TypeCategory::Bool),
        _ => {}
    }

    if let Some(size) = ty.strip_prefix("bytes") {
        return parse_size(size)
            .filter(|n| (1..=32).contains(n))
            .map(TypeCategory::FixedBytes);
    }
    if let Some(bits) = ty.strip_prefix("uint") {
        return parse_bits(bits).map(TypeCategory::Uint);
    }
    if let Some(bits) = ty.strip_prefix("int") {
        return parse_bits(bits).map(TypeCategory::Int);
    }
    None
}

/// `""` is the canonical alias for 256
fn parse_bits(s: &str) -> Option<usize> {
    if s.is_empty() {
        return Some(256);
    }
    parse_size(s).filter(|bits| *bits % 8 == 0 && (8..=256).contains(bits))
}

fn parse_size(s: &str) -> Option<usize> {
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_scalars() {
        assert_eq!(classify("bool"), Ok(TypeCategory::Bool));
        assert_eq!(classify("address"), Ok(TypeCategory::Address));
        assert_eq!(classify("string"), Ok(TypeCategory::String));
        assert_eq!(classify("bytes"), Ok(TypeCategory::Bytes));
        assert_eq!(classify("bytes14"), Ok(TypeCategory::FixedBytes(14)));
        assert_eq!(classify("uint256"), Ok(TypeCategory::Uint(256)));
        assert_eq!(classify("int32"), Ok(TypeCategory::Int(32)));
    }

    #[test]
    fn test_classify_aliases() {
        assert_eq!(classify("uint"), Ok(TypeCategory::Uint(256)));
        assert_eq!(classify("int"), Ok(TypeCategory::Int(256)));
        assert_eq!(classify("uint[]"), Ok(TypeCategory::UintArray(256)));
    }

    #[test]
    fn test_classify_arrays() {
        assert_eq!(classify("bool[]"), Ok(TypeCategory::BoolArray));
        assert_eq!(classify("bytes32[]"), Ok(TypeCategory::FixedBytesArray(32)));
        assert_eq!(classify("string[]"), Ok(TypeCategory::StringArray));
        assert_eq!(classify("address[]"), Ok(TypeCategory::AddressArray));
        assert_eq!(classify("uint8[]"), Ok(TypeCategory::UintArray(8)));
        assert_eq!(classify("int128[]"), Ok(TypeCategory::IntArray(128)));
    }

    #[test]
    fn test_classify_every_width() {
        for bits in (8..=256).step_by(8) {
            assert_eq!(classify(&format!("uint{bits}")), Ok(TypeCategory::Uint(bits)));
            assert_eq!(classify(&format!("int{bits}[]")), Ok(TypeCategory::IntArray(bits)));
        }
        for size in 1..=32 {
            assert_eq!(classify(&format!("bytes{size}")), Ok(TypeCategory::FixedBytes(size)));
        }
    }

    #[test]
    fn test_classify_bad_widths() {
        for ty in ["uint7", "uint264", "int0", "uint08", "bytes0", "bytes33", "bytes032", "uintx"] {
            assert_eq!(classify(ty), Err(ClassifyError::Unsupported), "{ty}");
        }
    }

    #[test]
    fn test_classify_unknown() {
        for ty in ["", "fixed128x18", "function", "Uint256", "uint256 ", "address[3]"] {
            assert_eq!(classify(ty), Err(ClassifyError::Unsupported), "{ty:?}");
        }
    }

    #[test]
    fn test_classify_dynamic_elements() {
        for ty in ["bytes[]", "string[][]", "uint256[][]", "(uint256,string)", "(address)[]", "string[2]", "bytes[3]"] {
            assert_eq!(classify(ty), Err(ClassifyError::DynamicElement), "{ty}");
        }
    }

    #[test]
    fn test_dynamic_categories() {
        assert!(!TypeCategory::FixedBytes(4).is_dynamic());
        assert!(!TypeCategory::Int(8).is_dynamic());
        assert!(TypeCategory::Bytes.is_dynamic());
        assert!(TypeCategory::AddressArray.is_dynamic());
        assert!(TypeCategory::StringArray.is_array());
        assert!(!TypeCategory::String.is_array());
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(TypeCategory::UintArray(256).to_string(), "uint256[]");
        assert_eq!(TypeCategory::FixedBytes(4).to_string(), "bytes4");
    }
}
