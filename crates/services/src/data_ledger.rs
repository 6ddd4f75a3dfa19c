//! The data ledger: content-hash records and time-boxed usage permissions.

use crate::admin::AdminRegistry;
use crate::authorizer::SignatureAuthorizer;
use crate::identity::IdentityRegistry;
use crate::store;
use meridian_api::state::StateAccess;
use meridian_api::TxContext;
use meridian_crypto::message;
use meridian_types::error::{DataError, TransactionError};
use meridian_types::keys::{permission_key, DATA_INDEX_PREFIX, DATA_OWNER_PREFIX};
use meridian_types::records::{Permission, PermissionStatus};
use meridian_types::{DataHash, Principal, Timestamp, TokenId};

/// Halt-flag name for this service.
pub const SERVICE_ID: &str = "data";

/// Records content hashes against registered identities and issues the
/// `(data hash, product uid)` permissions the product catalog consumes.
#[derive(Debug, Clone)]
pub struct DataLedger {
    domain: Principal,
}

impl DataLedger {
    pub fn new(domain: Principal) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> Principal {
        self.domain
    }

    fn owner_key(hash: &[u8]) -> Vec<u8> {
        [DATA_OWNER_PREFIX, hash].concat()
    }

    fn index_key(identity: TokenId) -> Vec<u8> {
        [DATA_INDEX_PREFIX, &identity.to_le_bytes()[..]].concat()
    }

    /// Records `data_hash` against `owner`'s identity, authorized by
    /// `owner`'s signature. Records are immutable: a hash can only ever be
    /// submitted once.
    pub fn submit_data(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        owner: &Principal,
        data_hash: &[u8],
        nonce: u64,
        signature: &[u8],
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        let owner_id = IdentityRegistry::require_registered(state, owner)?;

        let digest = message::submit_data_digest(owner, data_hash, nonce, &self.domain);
        SignatureAuthorizer::verify(state, owner, &digest, signature)?;

        let owner_key = Self::owner_key(data_hash);
        if state.get(&owner_key)?.is_some() {
            return Err(DataError::AlreadyTracked.into());
        }
        store::put_u64(state, &owner_key, owner_id)?;

        let index_key = Self::index_key(owner_id);
        let mut hashes: Vec<DataHash> = store::get_record(state, &index_key)?.unwrap_or_default();
        hashes.push(data_hash.to_vec());
        store::put_record(state, &index_key, &hashes)?;

        log::debug!(
            "data 0x{} recorded for identity {} (submitted by {})",
            hex::encode(data_hash),
            owner_id,
            ctx.caller
        );
        Ok(())
    }

    /// Grants the named requester identity permission to use `data_hash`
    /// in product `product_uid`, authorized by the data owner's signature.
    /// The deadline is `now + duration_secs`; signing a duration rather
    /// than an absolute deadline keeps the signed payload stable however
    /// long submission takes.
    #[allow(clippy::too_many_arguments)]
    pub fn grant_permission(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        owner: &Principal,
        requester_identity: TokenId,
        data_hash: &[u8],
        product_uid: TokenId,
        duration_secs: u64,
        nonce: u64,
        signature: &[u8],
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        // The submitting requester must itself be registered, and the
        // identity named in the grant must exist.
        IdentityRegistry::require_registered(state, &ctx.caller)?;
        IdentityRegistry::identity(state, requester_identity)?;

        let owner_id = IdentityRegistry::require_registered(state, owner)?;
        match Self::data_owner_identity(state, data_hash)? {
            Some(recorded) if recorded == owner_id => {}
            _ => return Err(DataError::NotDataOwner.into()),
        }

        let digest = message::grant_permission_digest(
            owner,
            requester_identity,
            data_hash,
            product_uid,
            nonce,
            duration_secs,
            &self.domain,
        );
        SignatureAuthorizer::verify(state, owner, &digest, signature)?;

        let permission = Permission {
            status: PermissionStatus::Granted,
            requester_identity,
            deadline: ctx.now + duration_secs,
        };
        store::put_record(state, &permission_key(product_uid, data_hash), &permission)?;

        log::debug!(
            "permission granted on 0x{} for product {} to identity {} until {}",
            hex::encode(data_hash),
            product_uid,
            requester_identity,
            permission.deadline
        );
        Ok(())
    }

    /// The stored permission status bit. Callers deciding whether use is
    /// actually allowed must combine this with the deadline; see
    /// [`Self::is_permitted`].
    pub fn permission_status(
        state: &dyn StateAccess,
        data_hash: &[u8],
        product_uid: TokenId,
    ) -> Result<PermissionStatus, TransactionError> {
        Ok(
            store::get_record::<Permission>(state, &permission_key(product_uid, data_hash))?
                .map(|p| p.status)
                .unwrap_or_default(),
        )
    }

    pub fn permission_deadline(
        state: &dyn StateAccess,
        data_hash: &[u8],
        product_uid: TokenId,
    ) -> Result<Timestamp, TransactionError> {
        Ok(
            store::get_record::<Permission>(state, &permission_key(product_uid, data_hash))?
                .map(|p| p.deadline)
                .unwrap_or_default(),
        )
    }

    /// The live permitted predicate: granted and unexpired at `now`.
    pub fn is_permitted(
        state: &dyn StateAccess,
        data_hash: &[u8],
        product_uid: TokenId,
        now: Timestamp,
    ) -> Result<bool, TransactionError> {
        Ok(
            store::get_record::<Permission>(state, &permission_key(product_uid, data_hash))?
                .map(|p| p.is_live(now))
                .unwrap_or(false),
        )
    }

    /// The identity that owns `data_hash`, if the hash is tracked.
    pub fn data_owner_identity(
        state: &dyn StateAccess,
        data_hash: &[u8],
    ) -> Result<Option<TokenId>, TransactionError> {
        let key = Self::owner_key(data_hash);
        if state.get(&key)?.is_none() {
            return Ok(None);
        }
        store::get_u64(state, &key).map(Some)
    }

    /// An identity's recorded hashes, in submission order.
    pub fn hashes_of(
        state: &dyn StateAccess,
        identity: TokenId,
    ) -> Result<Vec<DataHash>, TransactionError> {
        Ok(store::get_record(state, &Self::index_key(identity))?.unwrap_or_default())
    }

    /// One entry of an identity's ordered hash sequence.
    pub fn hash_at(
        state: &dyn StateAccess,
        identity: TokenId,
        index: usize,
    ) -> Result<Option<DataHash>, TransactionError> {
        Ok(Self::hashes_of(state, identity)?.into_iter().nth(index))
    }
}
