//! Identifier primitives shared by every service.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dense, sequential identifier for registered entities (identities and
/// products). `0` is reserved as the "none" value; real ids start at 1.
pub type TokenId = u64;

/// Seconds on the shared logical clock. The clock is monotone and advances
/// only between external calls, never within one.
pub type Timestamp = u64;

/// A fixed 32-byte value (KYC commitments, agreement digests, message hashes).
pub type Bytes32 = [u8; 32];

/// A content hash as submitted by a data owner. Variable length by design:
/// the ledger treats it as an opaque byte string and never inspects it.
pub type DataHash = Vec<u8>;

/// An opaque 20-byte account identifier.
///
/// Principals are derived from ECDSA public keys by the crypto crate, but the
/// rest of the kernel only ever compares them for equality and uses them as
/// state-key components.
#[derive(
    Encode, Decode, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct Principal(pub [u8; 20]);

impl Principal {
    /// The null principal. Never a valid signer.
    pub const ZERO: Principal = Principal([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl AsRef<[u8]> for Principal {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for Principal {
    fn from(bytes: [u8; 20]) -> Self {
        Principal(bytes)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal(0x{})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_principal_is_recognised() {
        assert!(Principal::ZERO.is_zero());
        assert!(!Principal([7u8; 20]).is_zero());
    }

    #[test]
    fn principal_renders_as_hex() {
        let p = Principal([0xab; 20]);
        assert_eq!(p.to_string(), format!("0x{}", "ab".repeat(20)));
    }
}
