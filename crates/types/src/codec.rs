//! The canonical, deterministic binary codec for all stored records.
//!
//! Thin wrappers around `parity-scale-codec` (SCALE). Centralizing the codec
//! here guarantees that every service writes the exact same byte
//! representation for the same record, which the replay-protection digests
//! and the transactional overlay both rely on.

use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into its canonical byte representation.
///
/// Use this for everything written to the state store.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Result<Vec<u8>, String> {
    Ok(v.encode())
}

/// Decodes a value from its canonical byte representation, failing fast on
/// trailing bytes or malformed input.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}
