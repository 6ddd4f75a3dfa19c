//! Distributor business agreements.

use crate::admin::AdminRegistry;
use crate::authorizer::SignatureAuthorizer;
use crate::store;
use meridian_api::state::StateAccess;
use meridian_api::TxContext;
use meridian_crypto::message;
use meridian_types::error::{AgreementError, TransactionError};
use meridian_types::keys::AGREEMENT_RECORD_PREFIX;
use meridian_types::records::DistributorAgreement;
use meridian_types::{Principal, TokenId};

/// Halt-flag name for this service.
pub const SERVICE_ID: &str = "agreements";

/// Records distributor agreements against the distributor's own signature
/// over the agreement digest. Either side may submit the call; the
/// signature is what binds the distributor.
#[derive(Debug, Clone)]
pub struct DistributorRegistry {
    domain: Principal,
}

impl DistributorRegistry {
    pub fn new(domain: Principal) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> Principal {
        self.domain
    }

    fn record_key(distributor: &Principal) -> Vec<u8> {
        [AGREEMENT_RECORD_PREFIX, distributor.as_ref()].concat()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_agreement(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        distributor: &Principal,
        agreement_hash: &[u8],
        product_uid: TokenId,
        total_units: u64,
        unit_price: u128,
        distributor_percent: u8,
        nonce: u64,
        signature: &[u8],
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        if distributor.is_zero() {
            return Err(AgreementError::ZeroAddress.into());
        }
        if total_units == 0 {
            return Err(AgreementError::ZeroUnits.into());
        }
        if unit_price == 0 {
            return Err(AgreementError::ZeroPrice.into());
        }
        if distributor_percent == 0 {
            return Err(AgreementError::ZeroPercent.into());
        }

        let digest =
            message::distributor_agreement_digest(distributor, agreement_hash, nonce, &self.domain);
        SignatureAuthorizer::verify(state, distributor, &digest, signature)?;

        let record = DistributorAgreement {
            distributor: *distributor,
            agreement_hash: agreement_hash.to_vec(),
            product_uid,
            total_units,
            unit_price,
            distributor_percent,
        };
        store::put_record(state, &Self::record_key(distributor), &record)?;

        log::info!(
            "agreement recorded for distributor {} on product {} ({} units, submitted by {})",
            distributor,
            product_uid,
            total_units,
            ctx.caller
        );
        Ok(())
    }

    pub fn agreement(
        state: &dyn StateAccess,
        distributor: &Principal,
    ) -> Result<Option<DistributorAgreement>, TransactionError> {
        store::get_record(state, &Self::record_key(distributor))
    }
}
