//! The proportional, lazily-evaluated profit distribution engine.
//!
//! Deposits only grow a cumulative per-product pool, so they are O(1) in
//! the number of holders. Each holder catches up on withdrawal: they
//! receive their truncated percentage of the pool delta since their own
//! high-water mark, and the mark jumps to the current pool. Percentages
//! are computed against the fixed supply snapshot taken when issuance
//! reached `RemainingMinted`; allowing withdrawals against a still-moving
//! supply would let differently-timed holders claim against different
//! implied totals.

use crate::admin::AdminRegistry;
use crate::shards::ShardVault;
use crate::store;
use meridian_api::state::StateAccess;
use meridian_api::token::{SettlementLedger, ShardLedger};
use meridian_api::TxContext;
use meridian_types::error::{EarningError, TokenError, TransactionError};
use meridian_types::keys::{EARNING_POINT_PREFIX, EARNING_RECORD_PREFIX};
use meridian_types::records::{Earning, SharePhase};
use meridian_types::{Principal, TokenId};

/// Halt-flag name for this service.
pub const SERVICE_ID: &str = "profit";

fn earning_key(uid: TokenId) -> Vec<u8> {
    [EARNING_RECORD_PREFIX, &uid.to_le_bytes()[..]].concat()
}

fn point_key(holder: &Principal, uid: TokenId) -> Vec<u8> {
    [
        EARNING_POINT_PREFIX,
        &uid.to_le_bytes()[..],
        b"::",
        holder.as_ref(),
    ]
    .concat()
}

/// Accepts settlement deposits against products and pays shareholders
/// their proportional share of undistributed earnings.
#[derive(Debug, Clone)]
pub struct ProfitEngine<Sh: ShardLedger, St: SettlementLedger> {
    shards: Sh,
    settlement: St,
    /// The engine's custody account holding deposited-but-unclaimed funds.
    custody: Principal,
}

impl<Sh: ShardLedger, St: SettlementLedger> ProfitEngine<Sh, St> {
    pub fn new(shards: Sh, settlement: St, custody: Principal) -> Self {
        Self {
            shards,
            settlement,
            custody,
        }
    }

    pub fn custody(&self) -> Principal {
        self.custody
    }

    /// Deposits `amount` of the settlement asset against `uid`. No
    /// per-holder state is touched here.
    pub fn deposit(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
        amount: u128,
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;
        if amount == 0 {
            return Err(EarningError::ZeroAmount.into());
        }

        self.settlement
            .transfer(state, &ctx.caller, &self.custody, amount)?;

        let mut earning: Earning =
            store::get_record(state, &earning_key(uid))?.unwrap_or_default();
        earning.total_deposited = earning
            .total_deposited
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow)?;
        store::put_record(state, &earning_key(uid), &earning)?;

        log::debug!(
            "deposit of {} against product {} by {} (pool now {})",
            amount,
            uid,
            ctx.caller,
            earning.total_deposited
        );
        Ok(())
    }

    /// Pays the caller their share of the pool delta above their
    /// high-water mark and advances the mark to the current pool.
    pub fn withdraw(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
    ) -> Result<u128, TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        let mut earning: Earning =
            store::get_record(state, &earning_key(uid))?.unwrap_or_default();
        if earning.total_deposited == 0 {
            return Err(EarningError::NoProductEarning.into());
        }

        let balance = self.shards.balance_of(state, uid, &ctx.caller)?;
        if balance == 0 {
            return Err(EarningError::NoShardBalance.into());
        }

        let supply = match ShardVault::config(state, uid)? {
            Some(config) if config.phase == SharePhase::RemainingMinted => {
                config.supply_snapshot.ok_or(EarningError::SupplyNotFinal)?
            }
            _ => return Err(EarningError::SupplyNotFinal.into()),
        };

        // Integer percent of the fixed supply, scaled to basis points for
        // finer truncation tolerance.
        let pct = u128::from(balance) * 100 / u128::from(supply);
        let points = pct * 100;

        let point_key = point_key(&ctx.caller, uid);
        let last_point = store::get_u128(state, &point_key)?;
        let owed = earning.total_deposited - last_point;
        let amount = points * owed / 10_000;
        if amount == 0 {
            return Err(EarningError::NoUserEarning.into());
        }

        self.settlement
            .transfer(state, &self.custody, &ctx.caller, amount)?;

        // High-water mark: jumps to the pool total, never accumulates.
        store::put_u128(state, &point_key, earning.total_deposited)?;
        earning.total_withdrawn = earning
            .total_withdrawn
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow)?;
        store::put_record(state, &earning_key(uid), &earning)?;

        log::info!(
            "withdrawal of {} from product {} by {} ({} points)",
            amount,
            uid,
            ctx.caller,
            points
        );
        Ok(amount)
    }
}

/// Cumulative deposits against a product.
pub fn product_earning(state: &dyn StateAccess, uid: TokenId) -> Result<u128, TransactionError> {
    Ok(store::get_record::<Earning>(state, &earning_key(uid))?
        .map(|e| e.total_deposited)
        .unwrap_or(0))
}

/// Cumulative withdrawals from a product.
pub fn total_withdrawal(state: &dyn StateAccess, uid: TokenId) -> Result<u128, TransactionError> {
    Ok(store::get_record::<Earning>(state, &earning_key(uid))?
        .map(|e| e.total_withdrawn)
        .unwrap_or(0))
}

/// A holder's high-water mark against a product.
pub fn holder_last_point(
    state: &dyn StateAccess,
    holder: &Principal,
    uid: TokenId,
) -> Result<u128, TransactionError> {
    store::get_u128(state, &point_key(holder, uid))
}
