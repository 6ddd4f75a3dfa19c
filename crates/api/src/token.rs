//! Capability interfaces for token bookkeeping.
//!
//! The kernel does not own a token standard. Shard balances and the
//! fungible settlement asset are external collaborators reached through
//! these traits; the services only assume mint/burn/balance/transfer
//! semantics plus, for shards, the post-issuance transfer-lock rule that
//! the implementation must enforce on every transfer.

use crate::context::TxContext;
use crate::state::StateAccess;
use meridian_types::error::TransactionError;
use meridian_types::{Principal, TokenId};

/// Per-`(product, holder)` fractional share bookkeeping.
pub trait ShardLedger {
    /// The holder's current balance in one product.
    fn balance_of(
        &self,
        state: &dyn StateAccess,
        uid: TokenId,
        holder: &Principal,
    ) -> Result<u64, TransactionError>;

    /// Credits freshly issued shards to a holder. Reserved for the
    /// issuance engine.
    fn mint(
        &self,
        state: &mut dyn StateAccess,
        uid: TokenId,
        to: &Principal,
        amount: u64,
    ) -> Result<(), TransactionError>;

    /// Destroys shards from a holder's balance.
    fn burn(
        &self,
        state: &mut dyn StateAccess,
        uid: TokenId,
        from: &Principal,
        amount: u64,
    ) -> Result<(), TransactionError>;

    /// Moves shards between holders. Implementations must re-evaluate the
    /// lock-window rule against `from`'s balance at call time.
    fn transfer(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
        from: &Principal,
        to: &Principal,
        amount: u64,
    ) -> Result<(), TransactionError>;
}

/// Fungible settlement-asset bookkeeping (deposits, payouts, sales).
pub trait SettlementLedger {
    /// The account's current settlement balance.
    fn balance_of(
        &self,
        state: &dyn StateAccess,
        who: &Principal,
    ) -> Result<u128, TransactionError>;

    /// Credits new settlement funds to an account (genesis / test funding).
    fn mint(
        &self,
        state: &mut dyn StateAccess,
        to: &Principal,
        amount: u128,
    ) -> Result<(), TransactionError>;

    /// Moves settlement funds between accounts.
    fn transfer(
        &self,
        state: &mut dyn StateAccess,
        from: &Principal,
        to: &Principal,
        amount: u128,
    ) -> Result<(), TransactionError>;
}
