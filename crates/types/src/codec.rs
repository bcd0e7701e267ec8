// Path: crates/types/src/codec.rs
//! The canonical, deterministic binary codec for task parameters and results.
//!
//! Every opaque parameter a VM pushes into a [`Task`](crate::Task) and every
//! return value the handling thread pushes back is a SCALE-encoded blob.

use parity_scale_codec::{Decode, DecodeLimit, Encode};

/// Deepest nesting of collections and tables accepted when decoding.
///
/// `StorageValue::Table` is recursive, so an unbounded decode of untrusted
/// bytes could exhaust the handling thread's stack.
pub const MAX_DECODE_DEPTH: u32 = 128;

/// Encodes a value into its canonical byte representation.
pub fn to_bytes_canonical<T: Encode>(value: &T) -> Vec<u8> {
    value.encode()
}

/// Decodes a value from its canonical byte representation.
///
/// Unlike a plain `Decode::decode`, trailing bytes are rejected: a parameter
/// must be exactly one encoded value. Nesting beyond [`MAX_DECODE_DEPTH`] is
/// an error.
pub fn from_bytes_canonical<T: Decode>(bytes: &[u8]) -> Result<T, String> {
    let mut input = bytes;
    let value = T::decode_with_depth_limit(MAX_DECODE_DEPTH, &mut input)
        .map_err(|e| e.to_string())?;
    if !input.is_empty() {
        return Err(format!("{} trailing bytes after value", input.len()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = to_bytes_canonical(&7u32);
        bytes.push(0xff);
        let err = from_bytes_canonical::<u32>(&bytes).unwrap_err();
        assert!(err.contains("trailing"));
    }

    #[test]
    fn rejects_nesting_past_depth_limit() {
        use crate::storage::StorageValue;
        use std::collections::BTreeMap;

        let nest = |depth: u32| {
            let mut value = StorageValue::Nil;
            for _ in 0..depth {
                value = StorageValue::Table(BTreeMap::from([(String::new(), value)]));
            }
            to_bytes_canonical(&value)
        };
        assert!(from_bytes_canonical::<StorageValue>(&nest(MAX_DECODE_DEPTH - 1)).is_ok());
        assert!(from_bytes_canonical::<StorageValue>(&nest(MAX_DECODE_DEPTH + 1)).is_err());
    }

    #[test]
    fn rejects_truncated_string() {
        let bytes = to_bytes_canonical(&"contract".to_string());
        assert!(from_bytes_canonical::<String>(&bytes[..3]).is_err());
    }
}
