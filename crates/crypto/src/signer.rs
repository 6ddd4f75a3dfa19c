//! A local ECDSA signer for tests and off-ledger tooling.

use crate::recover::{principal_of, SIGNATURE_LENGTH};
use k256::ecdsa::SigningKey;
use meridian_types::error::CryptoError;
use meridian_types::{Bytes32, Principal};
use rand::rngs::OsRng;

/// Holds a secp256k1 signing key and produces the 65-byte recoverable
/// signatures the authorization protocol consumes. This is tooling; the
/// kernel itself never holds private keys.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
}

impl LocalSigner {
    /// Generates a fresh random key.
    pub fn random() -> Self {
        Self {
            key: SigningKey::random(&mut OsRng),
        }
    }

    /// Builds a signer from a 32-byte seed. Fails on seeds outside the
    /// curve order (all-zero included).
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CryptoError> {
        let key = SigningKey::from_slice(seed).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// The principal this signer's signatures recover to.
    pub fn principal(&self) -> Principal {
        principal_of(self.key.verifying_key())
    }

    /// Signs a prepared recovery digest, returning `r || s || v` with `v`
    /// in the legacy 27/28 convention.
    pub fn sign_digest(&self, digest: &Bytes32) -> Result<[u8; SIGNATURE_LENGTH], CryptoError> {
        let (signature, recid) = self
            .key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recid.to_byte();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_seeds_give_distinct_principals() {
        let a = LocalSigner::from_seed(&[1u8; 32]).unwrap();
        let b = LocalSigner::from_seed(&[2u8; 32]).unwrap();
        assert_ne!(a.principal(), b.principal());
    }

    #[test]
    fn zero_seed_is_rejected() {
        assert!(LocalSigner::from_seed(&[0u8; 32]).is_err());
    }

    #[test]
    fn random_signer_has_nonzero_principal() {
        assert!(!LocalSigner::random().principal().is_zero());
    }
}
