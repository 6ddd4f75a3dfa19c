//! ECDSA public-key recovery over secp256k1.

use crate::digest::keccak256;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use meridian_types::error::CryptoError;
use meridian_types::{Bytes32, Principal};

/// Recoverable signatures are 65 bytes: `r || s || v`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Derives the 20-byte principal of a public key: the trailing 20 bytes of
/// the keccak-256 of the uncompressed point (without the 0x04 tag).
pub fn principal_of(key: &VerifyingKey) -> Principal {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Principal(out)
}

/// Recovers the signing principal from a 65-byte recoverable signature over
/// the given digest. The `v` byte accepts both the bare recovery id (0/1)
/// and the legacy 27/28 convention.
pub fn recover_signer(digest: &Bytes32, signature: &[u8]) -> Result<Principal, CryptoError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(CryptoError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LENGTH,
            signature.len()
        )));
    }

    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let v = signature[64];
    let recid_byte = if v >= 27 { v - 27 } else { v };
    let recid = RecoveryId::from_byte(recid_byte)
        .ok_or_else(|| CryptoError::InvalidSignature(format!("invalid recovery id: {}", v)))?;

    let key = VerifyingKey::recover_from_prehash(digest, &sig, recid)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;

    Ok(principal_of(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::recovery_digest;
    use crate::signer::LocalSigner;

    #[test]
    fn recovers_the_signing_principal() {
        let signer = LocalSigner::from_seed(&[7u8; 32]).unwrap();
        let digest = recovery_digest(&keccak256(b"message"));
        let signature = signer.sign_digest(&digest).unwrap();

        let recovered = recover_signer(&digest, &signature).unwrap();
        assert_eq!(recovered, signer.principal());
    }

    #[test]
    fn accepts_bare_and_legacy_recovery_ids() {
        let signer = LocalSigner::from_seed(&[9u8; 32]).unwrap();
        let digest = recovery_digest(&keccak256(b"either convention"));
        let mut signature = signer.sign_digest(&digest).unwrap();
        assert!(signature[64] >= 27);

        let legacy = recover_signer(&digest, &signature).unwrap();
        signature[64] -= 27;
        let bare = recover_signer(&digest, &signature).unwrap();
        assert_eq!(legacy, bare);
    }

    #[test]
    fn wrong_digest_recovers_a_different_principal() {
        let signer = LocalSigner::from_seed(&[11u8; 32]).unwrap();
        let digest = recovery_digest(&keccak256(b"signed payload"));
        let signature = signer.sign_digest(&digest).unwrap();

        let other = recovery_digest(&keccak256(b"substituted payload"));
        match recover_signer(&other, &signature) {
            Ok(p) => assert_ne!(p, signer.principal()),
            Err(CryptoError::RecoveryFailed(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn malformed_signatures_are_rejected() {
        let digest = recovery_digest(&keccak256(b"x"));
        assert!(matches!(
            recover_signer(&digest, &[0u8; 64]),
            Err(CryptoError::InvalidSignature(_))
        ));

        let mut signature = [1u8; 65];
        signature[64] = 5; // not a recovery id in either convention
        assert!(matches!(
            recover_signer(&digest, &signature),
            Err(CryptoError::InvalidSignature(_))
        ));
    }
}
