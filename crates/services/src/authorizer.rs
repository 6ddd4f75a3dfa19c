//! The signature authorization protocol every mutating entry point uses.

use meridian_api::state::StateAccess;
use meridian_crypto::recover_signer;
use meridian_types::error::{AuthError, TransactionError};
use meridian_types::keys::AUTH_DIGEST_PREFIX;
use meridian_types::{Bytes32, Principal};

/// Verifies authorization messages and tracks consumed digests.
///
/// The consumed set is an explicit keyed store injected via the state
/// handle, not a hidden singleton: digests marked consumed inside a failed
/// call are rolled back together with everything else the call wrote.
pub struct SignatureAuthorizer;

impl SignatureAuthorizer {
    fn digest_key(digest: &Bytes32) -> Vec<u8> {
        [AUTH_DIGEST_PREFIX, digest.as_slice()].concat()
    }

    /// Verifies that `signature` over `digest` recovers to `signer_claim`
    /// and that the digest has never been accepted before, then marks it
    /// consumed. Consumption is irreversible once the enclosing call
    /// commits.
    pub fn verify(
        state: &mut dyn StateAccess,
        signer_claim: &Principal,
        digest: &Bytes32,
        signature: &[u8],
    ) -> Result<(), TransactionError> {
        if signer_claim.is_zero() {
            return Err(AuthError::SignerZero.into());
        }

        let key = Self::digest_key(digest);
        if state.get(&key)?.is_some() {
            return Err(AuthError::SignatureReused.into());
        }

        let recovered = recover_signer(digest, signature).map_err(AuthError::from)?;
        if recovered != *signer_claim {
            return Err(AuthError::InvalidSignature(format!(
                "recovered {} does not match claimed signer {}",
                recovered, signer_claim
            ))
            .into());
        }

        state.insert(&key, &[1u8])?;
        log::debug!("authorization consumed for signer {}", signer_claim);
        Ok(())
    }

    /// Whether a digest has already been consumed.
    pub fn is_consumed(
        state: &dyn StateAccess,
        digest: &Bytes32,
    ) -> Result<bool, TransactionError> {
        Ok(state.get(&Self::digest_key(digest))?.is_some())
    }
}
