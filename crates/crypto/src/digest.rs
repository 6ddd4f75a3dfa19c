//! Canonical packed encoding and keccak-256 digesting.

use meridian_types::{Bytes32, DataHash, Principal};
use sha3::{Digest, Keccak256};

/// Keccak-256 of an arbitrary byte string.
pub fn keccak256(bytes: &[u8]) -> Bytes32 {
    let mut hasher = Keccak256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// The prefix applied to a 32-byte message hash before recovery, binding
/// the signature to this protocol's signing convention.
const RECOVERY_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Wraps a packed message hash in the recovery prefix. The result is the
/// digest that gets signed, recovered against, and marked consumed.
pub fn recovery_digest(message_hash: &Bytes32) -> Bytes32 {
    let mut hasher = Keccak256::new();
    hasher.update(RECOVERY_PREFIX);
    hasher.update(message_hash);
    hasher.finalize().into()
}

/// Builder for the tightly packed field encoding the message schemas use.
///
/// Packing rules: principals are 20 raw bytes, integers are 32-byte
/// big-endian words, integer lists pack each element as a full word,
/// strings and byte strings are their raw bytes with no length prefix.
/// Because the encoding is not self-delimiting, safety against field
/// substitution comes from every schema fixing its exact field order and
/// from the nonce and domain fields bound into each message.
#[derive(Default)]
pub struct PackedMessage {
    buf: Vec<u8>,
}

impl PackedMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, principal: &Principal) -> Self {
        self.buf.extend_from_slice(principal.as_ref());
        self
    }

    pub fn uint(mut self, value: u128) -> Self {
        self.buf.extend_from_slice(&[0u8; 16]);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn uint_list(mut self, values: &[u64]) -> Self {
        for value in values {
            self = self.uint(u128::from(*value));
        }
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn bytes32(mut self, value: &Bytes32) -> Self {
        self.buf.extend_from_slice(value);
        self
    }

    pub fn string(mut self, value: &str) -> Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    /// Keccak-256 of the packed buffer.
    pub fn finish(self) -> Bytes32 {
        keccak256(&self.buf)
    }
}

/// ABI-encodes a `bytes[]` value: an offset word to the array, the length
/// word, per-element offset words relative to the array data area, then
/// each element as a length word plus data padded to a word boundary.
fn abi_encode_bytes_array(items: &[DataHash]) -> Vec<u8> {
    const WORD: usize = 32;
    let mut out = Vec::new();

    let mut word = |value: usize, out: &mut Vec<u8>| {
        let mut w = [0u8; WORD];
        w[WORD - 16..].copy_from_slice(&(value as u128).to_be_bytes());
        out.extend_from_slice(&w);
    };

    word(WORD, &mut out); // offset to the array
    word(items.len(), &mut out); // element count

    // Element offsets, relative to the start of the element area.
    let mut offset = items.len() * WORD;
    for item in items {
        word(offset, &mut out);
        offset += WORD + item.len().div_ceil(WORD) * WORD;
    }

    for item in items {
        word(item.len(), &mut out);
        out.extend_from_slice(item);
        let padding = item.len().div_ceil(WORD) * WORD - item.len();
        out.extend_from_slice(&vec![0u8; padding]);
    }

    out
}

/// The single 32-byte commitment to an ordered hash list used by the
/// product credit-attestation schema.
pub fn concatenated_data_hash(hashes: &[DataHash]) -> Bytes32 {
    keccak256(&abi_encode_bytes_array(hashes))
}
