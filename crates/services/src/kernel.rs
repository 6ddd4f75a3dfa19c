//! The kernel façade: service wiring and the transactional call boundary.

use crate::admin::AdminRegistry;
use crate::agreement::DistributorRegistry;
use crate::data_ledger::DataLedger;
use crate::governance::ProposalBoard;
use crate::identity::IdentityRegistry;
use crate::marketplace::ShardMarketplace;
use crate::product_catalog::ProductCatalog;
use crate::profit::ProfitEngine;
use crate::settlement::SettlementVault;
use crate::shards::{ShardIssuance, ShardVault};
use meridian_api::state::{StateAccess, StateOverlay};
use meridian_api::TxContext;
use meridian_types::error::TransactionError;
use meridian_types::Principal;
use serde::{Deserialize, Serialize};

/// Construction-time wiring for a kernel instance.
///
/// Each service gets its own domain principal, standing for the deployed
/// instance a signature is bound to; signatures for one instance can never
/// be replayed against another. `attester` selects the product catalog's
/// attested variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    pub admin: Principal,
    pub identity_domain: Principal,
    pub data_domain: Principal,
    pub product_domain: Principal,
    pub agreement_domain: Principal,
    pub market_domain: Principal,
    /// Trusted credit attester; `None` selects the identity-only product
    /// creation variant.
    pub attester: Option<Principal>,
    /// Custody account for the profit engine's undistributed funds.
    pub custody: Principal,
}

/// The wired service instances, shared by every call.
pub struct ServiceSet {
    pub identity: IdentityRegistry,
    pub data: DataLedger,
    pub products: ProductCatalog,
    pub issuance: ShardIssuance,
    pub shards: ShardVault,
    pub settlement: SettlementVault,
    pub profit: ProfitEngine<ShardVault, SettlementVault>,
    pub agreements: DistributorRegistry,
    pub market: ShardMarketplace<ShardVault, SettlementVault>,
    pub proposals: ProposalBoard,
}

impl ServiceSet {
    fn new(config: &KernelConfig) -> Self {
        Self {
            identity: IdentityRegistry::new(config.identity_domain),
            data: DataLedger::new(config.data_domain),
            products: ProductCatalog::new(config.product_domain, config.attester),
            issuance: ShardIssuance,
            shards: ShardVault,
            settlement: SettlementVault,
            profit: ProfitEngine::new(ShardVault, SettlementVault, config.custody),
            agreements: DistributorRegistry::new(config.agreement_domain),
            market: ShardMarketplace::new(config.market_domain, ShardVault, SettlementVault),
            proposals: ProposalBoard,
        }
    }
}

/// Owns the state store and executes every external call as one atomic
/// unit: the call runs against a copy-on-write overlay, and only a fully
/// successful call has its ordered write batch applied to the store. A
/// failing call leaves the store byte-identical, consumed authorization
/// digests included.
pub struct Kernel<S: StateAccess> {
    store: S,
    services: ServiceSet,
}

impl<S: StateAccess> Kernel<S> {
    pub fn new(mut store: S, config: KernelConfig) -> Result<Self, TransactionError> {
        AdminRegistry::initialize(&mut store, &config.admin)?;
        let services = ServiceSet::new(&config);
        Ok(Self { store, services })
    }

    pub fn services(&self) -> &ServiceSet {
        &self.services
    }

    /// Direct read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Executes one external call. `f` sees the services and an overlay of
    /// the store; on `Ok` the overlay commits as a single batch, on `Err`
    /// it is discarded whole.
    pub fn execute<T>(
        &mut self,
        ctx: TxContext,
        f: impl FnOnce(&ServiceSet, &mut dyn StateAccess, &TxContext) -> Result<T, TransactionError>,
    ) -> Result<T, TransactionError> {
        let services = &self.services;
        let mut overlay = StateOverlay::new(&self.store);
        let out = f(services, &mut overlay, &ctx)?;
        let (inserts, deletes) = overlay.into_ordered_batch();
        self.store.batch_apply(&inserts, &deletes)?;
        Ok(out)
    }

    /// Runs a read-only view against the committed store.
    pub fn view<T>(
        &self,
        f: impl FnOnce(&ServiceSet, &dyn StateAccess) -> Result<T, TransactionError>,
    ) -> Result<T, TransactionError> {
        f(&self.services, &self.store)
    }

    /// Admin convenience: halts or resumes one service.
    pub fn set_halted(
        &mut self,
        ctx: TxContext,
        service: &str,
        halted: bool,
    ) -> Result<(), TransactionError> {
        self.execute(ctx, |_, state, ctx| {
            AdminRegistry::set_halted(state, ctx, service, halted)
        })
    }
}
