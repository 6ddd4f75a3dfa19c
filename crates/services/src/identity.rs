//! The identity registry: one live identity per principal.

use crate::admin::AdminRegistry;
use crate::authorizer::SignatureAuthorizer;
use crate::store;
use meridian_api::state::StateAccess;
use meridian_api::TxContext;
use meridian_crypto::message;
use meridian_types::error::{IdentityError, TransactionError};
use meridian_types::keys::{IDENTITY_NEXT_ID_KEY, IDENTITY_OWNER_PREFIX, IDENTITY_RECORD_PREFIX};
use meridian_types::records::Identity;
use meridian_types::{Bytes32, Principal, TokenId};

/// Halt-flag name for this service.
pub const SERVICE_ID: &str = "identity";

/// Issues dense sequential identity ids against owner signatures and keeps
/// the principal -> id index that every other service resolves through.
#[derive(Debug, Clone)]
pub struct IdentityRegistry {
    /// Instance identifier bound into every signed message this registry
    /// accepts; signatures cannot be replayed against another instance.
    domain: Principal,
}

impl IdentityRegistry {
    pub fn new(domain: Principal) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> Principal {
        self.domain
    }

    fn record_key(id: TokenId) -> Vec<u8> {
        [IDENTITY_RECORD_PREFIX, &id.to_le_bytes()[..]].concat()
    }

    fn owner_key(owner: &Principal) -> Vec<u8> {
        [IDENTITY_OWNER_PREFIX, owner.as_ref()].concat()
    }

    /// Registers a new identity for `owner`, authorized by `owner`'s own
    /// signature over the identity schema. The submitting caller may be a
    /// sponsor; only the signature decides consent.
    #[allow(clippy::too_many_arguments)]
    pub fn create_identity(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        owner: &Principal,
        kyc: Option<Bytes32>,
        metadata_uri: &str,
        nonce: u64,
        signature: &[u8],
    ) -> Result<TokenId, TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        let digest =
            message::create_identity_digest(owner, kyc.as_ref(), metadata_uri, nonce, &self.domain);
        SignatureAuthorizer::verify(state, owner, &digest, signature)?;

        if Self::owner_identity(state, owner)? != 0 {
            return Err(IdentityError::AlreadyRegistered.into());
        }

        let id = store::get_u64(state, IDENTITY_NEXT_ID_KEY)?.max(1);
        store::put_u64(state, IDENTITY_NEXT_ID_KEY, id + 1)?;

        let record = Identity {
            id,
            owner: *owner,
            metadata_uri: metadata_uri.to_string(),
            kyc,
        };
        store::put_record(state, &Self::record_key(id), &record)?;
        store::put_u64(state, &Self::owner_key(owner), id)?;

        log::debug!(
            "identity {} registered for {} (submitted by {})",
            id,
            owner,
            ctx.caller
        );
        Ok(id)
    }

    /// Revokes an identity. Only its owner may do this; the owner index is
    /// cleared so the principal can register again under a fresh id.
    pub fn revoke_identity(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        id: TokenId,
    ) -> Result<(), TransactionError> {
        let record = Self::identity(state, id)?;
        if record.owner != ctx.caller {
            return Err(IdentityError::NotOwner.into());
        }

        state.delete(&Self::record_key(id))?;
        state.delete(&Self::owner_key(&record.owner))?;
        log::debug!("identity {} revoked by {}", id, ctx.caller);
        Ok(())
    }

    /// The principal's identity id, or 0 when none is registered.
    pub fn owner_identity(
        state: &dyn StateAccess,
        owner: &Principal,
    ) -> Result<TokenId, TransactionError> {
        store::get_u64(state, &Self::owner_key(owner))
    }

    pub fn is_registered(
        state: &dyn StateAccess,
        owner: &Principal,
    ) -> Result<bool, TransactionError> {
        Ok(Self::owner_identity(state, owner)? != 0)
    }

    pub fn identity(state: &dyn StateAccess, id: TokenId) -> Result<Identity, TransactionError> {
        store::get_record(state, &Self::record_key(id))?
            .ok_or_else(|| IdentityError::UnknownIdentity(id).into())
    }

    /// The registered id for `owner`, or `NotRegistered`.
    pub fn require_registered(
        state: &dyn StateAccess,
        owner: &Principal,
    ) -> Result<TokenId, TransactionError> {
        let id = Self::owner_identity(state, owner)?;
        if id == 0 {
            return Err(IdentityError::NotRegistered.into());
        }
        Ok(id)
    }
}
