//! The product catalog: aggregation of permitted data into products.

use crate::admin::AdminRegistry;
use crate::authorizer::SignatureAuthorizer;
use crate::data_ledger::DataLedger;
use crate::identity::IdentityRegistry;
use crate::store;
use meridian_api::state::StateAccess;
use meridian_api::TxContext;
use meridian_crypto::message;
use meridian_types::error::{AuthError, IdentityError, ProductError, TransactionError};
use meridian_types::keys::{product_credit_key, PRODUCT_RECORD_PREFIX};
use meridian_types::records::Product;
use meridian_types::{DataHash, Principal, TokenId};

/// Halt-flag name for this service.
pub const SERVICE_ID: &str = "products";

/// A third-party credit attestation accompanying product creation when the
/// catalog is configured with a trusted attester.
#[derive(Debug, Clone)]
pub struct CreditAttestation {
    pub nonce: u64,
    pub signature: Vec<u8>,
}

/// Stores products and their per-hash credit weights.
///
/// Two authorization variants exist as configurations of this one type,
/// selected at construction: without an attester, holding the creator
/// identity is sufficient; with one, an attester signature over the full
/// creation payload is additionally required before any permission check.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    domain: Principal,
    attester: Option<Principal>,
}

impl ProductCatalog {
    pub fn new(domain: Principal, attester: Option<Principal>) -> Self {
        Self { domain, attester }
    }

    pub fn domain(&self) -> Principal {
        self.domain
    }

    pub fn attester(&self) -> Option<Principal> {
        self.attester
    }

    fn record_key(uid: TokenId) -> Vec<u8> {
        [PRODUCT_RECORD_PREFIX, &uid.to_le_bytes()[..]].concat()
    }

    fn check_lengths(hashes: &[DataHash], credits: &[u64]) -> Result<(), TransactionError> {
        if hashes.len() != credits.len() {
            return Err(ProductError::LengthMismatch {
                hashes: hashes.len(),
                credits: credits.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Every `(hash, uid)` pair must be granted and unexpired; the first
    /// failure aborts the whole call.
    fn check_permissions(
        state: &dyn StateAccess,
        uid: TokenId,
        hashes: &[DataHash],
        now: u64,
    ) -> Result<(), TransactionError> {
        for hash in hashes {
            if !DataLedger::is_permitted(state, hash, uid, now)? {
                return Err(ProductError::DataNotPermitted(hex::encode(hash)).into());
            }
        }
        Ok(())
    }

    fn store_credits(
        state: &mut dyn StateAccess,
        uid: TokenId,
        hashes: &[DataHash],
        credits: &[u64],
    ) -> Result<(), TransactionError> {
        for (hash, credit) in hashes.iter().zip(credits) {
            store::put_u64(state, &product_credit_key(uid, hash), *credit)?;
        }
        Ok(())
    }

    /// Assembles a product from currently permitted data hashes. The
    /// caller must own `creator_identity`; the product is owned by the
    /// caller principal.
    #[allow(clippy::too_many_arguments)]
    pub fn create_product(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        creator_identity: TokenId,
        uid: TokenId,
        uri: &str,
        data_hashes: &[DataHash],
        credits: &[u64],
        attestation: Option<&CreditAttestation>,
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        // The attester trust boundary comes before everything else the
        // caller can influence.
        if let Some(attester) = self.attester {
            if attester.is_zero() {
                return Err(AuthError::SignerZero.into());
            }
            let attestation = attestation.ok_or(ProductError::AttestationRequired)?;
            let digest = message::product_attestation_digest(
                uid,
                attestation.nonce,
                uri,
                &attester,
                data_hashes,
                credits,
                &ctx.caller,
                &self.domain,
            );
            SignatureAuthorizer::verify(state, &attester, &digest, &attestation.signature)?;
        }

        let caller_id = IdentityRegistry::require_registered(state, &ctx.caller)?;
        if caller_id != creator_identity {
            return Err(IdentityError::NotOwner.into());
        }

        Self::check_lengths(data_hashes, credits)?;

        if state.get(&Self::record_key(uid))?.is_some() {
            return Err(ProductError::AlreadyTracked(uid).into());
        }

        Self::check_permissions(state, uid, data_hashes, ctx.now)?;

        let product = Product {
            uid,
            owner: ctx.caller,
            creator_identity,
            uri: uri.to_string(),
            data_hashes: data_hashes.to_vec(),
            initial_data_count: data_hashes.len() as u32,
        };
        store::put_record(state, &Self::record_key(uid), &product)?;
        Self::store_credits(state, uid, data_hashes, credits)?;

        log::info!(
            "product {} created by identity {} with {} data hashes",
            uid,
            creator_identity,
            data_hashes.len()
        );
        Ok(())
    }

    /// Appends newly permitted data to an existing product. Restricted to
    /// the product creator; existing entries never move.
    pub fn link_new_data(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
        new_hashes: &[DataHash],
        new_credits: &[u64],
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        let mut product = Self::product(state, uid)?;
        if product.owner != ctx.caller {
            return Err(ProductError::OnlyCreator.into());
        }

        Self::check_lengths(new_hashes, new_credits)?;
        Self::check_permissions(state, uid, new_hashes, ctx.now)?;

        product.data_hashes.extend_from_slice(new_hashes);
        store::put_record(state, &Self::record_key(uid), &product)?;
        Self::store_credits(state, uid, new_hashes, new_credits)?;

        log::info!("product {} linked {} new data hashes", uid, new_hashes.len());
        Ok(())
    }

    pub fn product(state: &dyn StateAccess, uid: TokenId) -> Result<Product, TransactionError> {
        store::get_record(state, &Self::record_key(uid))?
            .ok_or_else(|| ProductError::UnknownProduct(uid).into())
    }

    /// The product's recorded hashes, creation-time entries first.
    pub fn product_data(
        state: &dyn StateAccess,
        uid: TokenId,
    ) -> Result<Vec<DataHash>, TransactionError> {
        Ok(Self::product(state, uid)?.data_hashes)
    }

    /// The credit weight recorded for `(hash, uid)`; 0 when unlinked.
    pub fn data_credit(
        state: &dyn StateAccess,
        data_hash: &[u8],
        uid: TokenId,
    ) -> Result<u64, TransactionError> {
        store::get_u64(state, &product_credit_key(uid, data_hash))
    }

    /// The principal behind a recorded hash, resolved through the data
    /// ledger and the identity registry.
    pub fn data_owner_principal(
        state: &dyn StateAccess,
        data_hash: &[u8],
    ) -> Result<Option<Principal>, TransactionError> {
        match DataLedger::data_owner_identity(state, data_hash)? {
            Some(id) => Ok(Some(IdentityRegistry::identity(state, id)?.owner)),
            None => Ok(None),
        }
    }
}
