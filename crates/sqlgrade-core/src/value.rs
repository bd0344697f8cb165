//! Result-set cell values and their canonical hash.
//!
//! The hash is only a bucketing hint: two equal values always hash the same,
//! but two values with the same hash still have to be compared with
//! [`Value::is_same`].

use serde::{Deserialize, Serialize};

/// Hash of a [`Value`] or of a whole row.
pub type Hash = u64;

/// Hash shared by every NULL.
pub const NULL_HASH: Hash = 17;

/// A single cell of a result set, typed by the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns `true` if this is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Computes the canonical hash of this value.
    ///
    /// Numbers hash to themselves, text goes through a 53-bit string hash,
    /// blobs hash to the sum of their bytes and every NULL hashes to
    /// [`NULL_HASH`].
    #[must_use]
    pub fn canonical_hash(&self) -> Hash {
        match self {
            Self::Null => NULL_HASH,
            Self::Integer(n) => integer_hash(*n),
            Self::Real(f) => integral(*f).map_or_else(|| f.to_bits(), integer_hash),
            Self::Text(s) => cyrb53(s),
            Self::Blob(bytes) => bytes
                .iter()
                .map(|b| Hash::from(*b))
                .fold(0, Hash::wrapping_add),
        }
    }

    /// Grading equality: same kind and same content.
    ///
    /// Integers and reals are both numbers and compare numerically. NULL is
    /// only ever the same as NULL.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Integer(a), Self::Real(b)) | (Self::Real(b), Self::Integer(a)) => {
                integral(*b) == Some(*a)
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Blob(a), Self::Blob(b)) => a == b,
            _ => false,
        }
    }
}

#[allow(clippy::cast_sign_loss)]
const fn integer_hash(n: i64) -> Hash {
    n as Hash
}

/// Returns the integer a real holds exactly, if any.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then(|| f as i64)
}

/// cyrb53 over UTF-16 code units, folded into 53 bits.
fn cyrb53(text: &str) -> Hash {
    let mut h1: u32 = 0xdead_beef;
    let mut h2: u32 = 0x41c6_ce57;
    for unit in text.encode_utf16() {
        let ch = u32::from(unit);
        h1 = (h1 ^ ch).wrapping_mul(2_654_435_761);
        h2 = (h2 ^ ch).wrapping_mul(1_597_334_677);
    }
    h1 = (h1 ^ (h1 >> 16)).wrapping_mul(2_246_822_507);
    h1 ^= (h2 ^ (h2 >> 13)).wrapping_mul(3_266_489_909);
    h2 = (h2 ^ (h2 >> 16)).wrapping_mul(2_246_822_507);
    h2 ^= (h1 ^ (h1 >> 13)).wrapping_mul(3_266_489_909);

    (Hash::from(h2 & 0x001f_ffff) << 32) | Hash::from(h1)
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_hash_is_fixed() {
        assert_eq!(Value::Null.canonical_hash(), NULL_HASH);
        assert_eq!(Value::from(None::<i64>).canonical_hash(), NULL_HASH);
    }

    #[test]
    fn test_integer_hashes_to_itself() {
        assert_eq!(Value::Integer(42).canonical_hash(), 42);
        assert_eq!(Value::Integer(-1).canonical_hash(), u64::MAX);
    }

    #[test]
    fn test_integral_real_hashes_like_integer() {
        assert_eq!(
            Value::Real(3.0).canonical_hash(),
            Value::Integer(3).canonical_hash()
        );
        assert_ne!(
            Value::Real(3.5).canonical_hash(),
            Value::Integer(3).canonical_hash()
        );
    }

    #[test]
    fn test_text_hash_is_deterministic() {
        let a = Value::from("Stockholm").canonical_hash();
        let b = Value::from("Stockholm").canonical_hash();
        let c = Value::from("stockholm").canonical_hash();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < (1 << 53));
    }

    #[test]
    fn test_blob_hash_sums_bytes() {
        assert_eq!(Value::Blob(vec![1, 2, 3]).canonical_hash(), 6);
        assert_eq!(Value::Blob(vec![]).canonical_hash(), 0);
    }

    #[test]
    fn test_is_same_requires_same_kind() {
        assert!(Value::Null.is_same(&Value::Null));
        assert!(!Value::Null.is_same(&Value::Integer(17)));
        assert!(!Value::Integer(17).is_same(&Value::Null));
        assert!(!Value::from("1").is_same(&Value::Integer(1)));
        assert!(!Value::Blob(vec![6]).is_same(&Value::Blob(vec![1, 2, 3])));
        assert!(Value::Blob(vec![1, 2, 3]).is_same(&Value::Blob(vec![1, 2, 3])));
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert!(Value::Integer(2).is_same(&Value::Real(2.0)));
        assert!(Value::Real(2.0).is_same(&Value::Integer(2)));
        assert!(!Value::Real(2.5).is_same(&Value::Integer(2)));
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, 1, 1.5, "a", [0, 255]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Integer(1),
                Value::Real(1.5),
                Value::from("a"),
                Value::Blob(vec![0, 255]),
            ]
        );
    }
}
