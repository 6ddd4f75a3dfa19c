//! Shared harness for the end-to-end kernel suites.
#![allow(dead_code)]

use meridian_api::state::MemoryState;
use meridian_api::{LogicalClock, TxContext};
use meridian_crypto::{message, LocalSigner};
use meridian_services::{Kernel, KernelConfig};
use meridian_types::error::TransactionError;
use meridian_types::{DataHash, Principal, TokenId};

pub const DAY: u64 = 24 * 60 * 60;

pub struct Harness {
    pub kernel: Kernel<MemoryState>,
    pub clock: LogicalClock,
    pub admin: LocalSigner,
    nonce: u64,
}

impl Harness {
    pub fn new(attester: Option<Principal>) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let admin = LocalSigner::from_seed(&[0xA0; 32]).unwrap();
        let config = KernelConfig {
            admin: admin.principal(),
            identity_domain: Principal([0x11; 20]),
            data_domain: Principal([0x22; 20]),
            product_domain: Principal([0x33; 20]),
            agreement_domain: Principal([0x44; 20]),
            market_domain: Principal([0x55; 20]),
            attester,
            custody: Principal([0xCC; 20]),
        };
        Self {
            kernel: Kernel::new(MemoryState::new(), config).unwrap(),
            clock: LogicalClock::starting_at(1_700_000_000),
            admin,
            nonce: 0,
        }
    }

    pub fn next_nonce(&mut self) -> u64 {
        self.nonce += 1;
        self.nonce
    }

    pub fn ctx(&self, caller: Principal) -> TxContext {
        self.clock.ctx(caller)
    }

    /// Creates an identity for the signer, submitted by the signer itself.
    pub fn register(&mut self, signer: &LocalSigner) -> Result<TokenId, TransactionError> {
        let nonce = self.next_nonce();
        let owner = signer.principal();
        let domain = self.kernel.services().identity.domain();
        let digest = message::create_identity_digest(&owner, None, "/tokenURIHere", nonce, &domain);
        let signature = signer.sign_digest(&digest).unwrap();
        let ctx = self.ctx(owner);
        self.kernel.execute(ctx, |svc, state, ctx| {
            svc.identity
                .create_identity(state, ctx, &owner, None, "/tokenURIHere", nonce, &signature)
        })
    }

    /// Submits a data hash on behalf of its owner.
    pub fn submit_data(
        &mut self,
        owner: &LocalSigner,
        hash: &[u8],
    ) -> Result<(), TransactionError> {
        let nonce = self.next_nonce();
        let principal = owner.principal();
        let domain = self.kernel.services().data.domain();
        let digest = message::submit_data_digest(&principal, hash, nonce, &domain);
        let signature = owner.sign_digest(&digest).unwrap();
        let ctx = self.ctx(principal);
        self.kernel.execute(ctx, |svc, state, ctx| {
            svc.data
                .submit_data(state, ctx, &principal, hash, nonce, &signature)
        })
    }

    /// The data owner grants `requester_identity` use of `hash` in
    /// `product_uid`; the requester submits the call.
    pub fn grant_permission(
        &mut self,
        owner: &LocalSigner,
        requester: &LocalSigner,
        requester_identity: TokenId,
        hash: &[u8],
        product_uid: TokenId,
        duration: u64,
    ) -> Result<(), TransactionError> {
        let nonce = self.next_nonce();
        let principal = owner.principal();
        let domain = self.kernel.services().data.domain();
        let digest = message::grant_permission_digest(
            &principal,
            requester_identity,
            hash,
            product_uid,
            nonce,
            duration,
            &domain,
        );
        let signature = owner.sign_digest(&digest).unwrap();
        let ctx = self.ctx(requester.principal());
        self.kernel.execute(ctx, |svc, state, ctx| {
            svc.data.grant_permission(
                state,
                ctx,
                &principal,
                requester_identity,
                hash,
                product_uid,
                duration,
                nonce,
                &signature,
            )
        })
    }

    /// Plain-variant product creation by the creator.
    pub fn create_product(
        &mut self,
        creator: &LocalSigner,
        creator_identity: TokenId,
        uid: TokenId,
        hashes: &[DataHash],
        credits: &[u64],
    ) -> Result<(), TransactionError> {
        let ctx = self.ctx(creator.principal());
        let hashes = hashes.to_vec();
        let credits = credits.to_vec();
        self.kernel.execute(ctx, |svc, state, ctx| {
            svc.products.create_product(
                state,
                ctx,
                creator_identity,
                uid,
                "/ProductURI",
                &hashes,
                &credits,
                None,
            )
        })
    }

    /// Funds an account with settlement tokens.
    pub fn fund(&mut self, to: Principal, amount: u128) {
        let ctx = self.ctx(to);
        self.kernel
            .execute(ctx, |svc, state, _| {
                use meridian_api::token::SettlementLedger;
                svc.settlement.mint(state, &to, amount)
            })
            .unwrap();
    }

    /// A holder's shard balance in a product.
    pub fn shard_balance(&self, uid: TokenId, holder: Principal) -> u64 {
        self.kernel
            .view(|svc, state| {
                use meridian_api::token::ShardLedger;
                svc.shards.balance_of(state, uid, &holder)
            })
            .unwrap()
    }

    /// An account's settlement balance.
    pub fn settlement_balance(&self, who: Principal) -> u128 {
        self.kernel
            .view(|svc, state| {
                use meridian_api::token::SettlementLedger;
                svc.settlement.balance_of(state, &who)
            })
            .unwrap()
    }
}

/// Deterministic signers for the cast of test principals.
pub fn signer(tag: u8) -> LocalSigner {
    let mut seed = [0u8; 32];
    seed[0] = 1;
    seed[31] = tag;
    LocalSigner::from_seed(&seed).unwrap()
}
