//! Fractional share issuance and the shard vault.
//!
//! Issuance is a forward-only state machine per product:
//! `Uninitialized -> InitialDistributed -> FutureDistributed ->
//! RemainingMinted`. Both distribution phases use the same two-step
//! truncating split; whatever truncation leaves behind is minted to the
//! final recipient by `mint_remaining`, which is why the running
//! `minted_so_far` total is tracked exactly and why `FutureDistributed` is
//! not a safe resting state for supply invariants.

use crate::admin::AdminRegistry;
use crate::product_catalog::ProductCatalog;
use crate::store;
use meridian_api::state::StateAccess;
use meridian_api::token::ShardLedger;
use meridian_api::TxContext;
use meridian_types::error::{DataError, ProductError, ShardError, TokenError, TransactionError};
use meridian_types::keys::{shard_balance_key, SHARD_CONFIG_PREFIX};
use meridian_types::records::{ShardConfig, SharePhase};
use meridian_types::{Principal, TokenId};

/// Halt-flag name for this service.
pub const SERVICE_ID: &str = "shards";

/// Per-`(product, holder)` balance bookkeeping with the post-issuance
/// transfer lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShardVault;

impl ShardVault {
    pub(crate) fn config_key(uid: TokenId) -> Vec<u8> {
        [SHARD_CONFIG_PREFIX, &uid.to_le_bytes()[..]].concat()
    }

    pub(crate) fn config(
        state: &dyn StateAccess,
        uid: TokenId,
    ) -> Result<Option<ShardConfig>, TransactionError> {
        store::get_record(state, &Self::config_key(uid))
    }
}

impl ShardLedger for ShardVault {
    fn balance_of(
        &self,
        state: &dyn StateAccess,
        uid: TokenId,
        holder: &Principal,
    ) -> Result<u64, TransactionError> {
        store::get_u64(state, &shard_balance_key(uid, holder))
    }

    fn mint(
        &self,
        state: &mut dyn StateAccess,
        uid: TokenId,
        to: &Principal,
        amount: u64,
    ) -> Result<(), TransactionError> {
        let balance = self.balance_of(state, uid, to)?;
        let updated = balance
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow)?;
        store::put_u64(state, &shard_balance_key(uid, to), updated)
    }

    fn burn(
        &self,
        state: &mut dyn StateAccess,
        uid: TokenId,
        from: &Principal,
        amount: u64,
    ) -> Result<(), TransactionError> {
        let balance = self.balance_of(state, uid, from)?;
        if balance < amount {
            return Err(ShardError::InsufficientBalance.into());
        }
        store::put_u64(state, &shard_balance_key(uid, from), balance - amount)
    }

    /// Moves shards between holders. Inside the lock window a single call
    /// may move at most half of the sender's balance in the product; the
    /// threshold is re-evaluated against the current balance on every
    /// call, not accumulated.
    fn transfer(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
        from: &Principal,
        to: &Principal,
        amount: u64,
    ) -> Result<(), TransactionError> {
        let from_balance = self.balance_of(state, uid, from)?;
        if from_balance < amount {
            return Err(ShardError::InsufficientBalance.into());
        }

        if let Some(config) = Self::config(state, uid)? {
            if ctx.now <= config.lock_deadline && u128::from(amount) * 2 > u128::from(from_balance)
            {
                return Err(ShardError::LockPeriodActive.into());
            }
        }

        let to_balance = self.balance_of(state, uid, to)?;
        let credited = to_balance
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow)?;
        store::put_u64(state, &shard_balance_key(uid, from), from_balance - amount)?;
        store::put_u64(state, &shard_balance_key(uid, to), credited)
    }
}

/// The multi-phase issuance engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShardIssuance;

impl ShardIssuance {
    /// Two-step truncating split: the contributor's integer percentage of
    /// the weight total first, then that percentage of the pool. Both
    /// divisions truncate; the residue is absorbed by the remaining mint.
    fn percent_share(pool: u64, credit: u64, total_credit: u128) -> u64 {
        let pct = u128::from(credit) * 100 / total_credit;
        (u128::from(pool) * pct / 100) as u64
    }

    fn percent_pool(target_supply: u64, percent: u8) -> u64 {
        (u128::from(target_supply) * u128::from(percent) / 100) as u64
    }

    fn expect_phase(
        config: Option<&ShardConfig>,
        expected: SharePhase,
    ) -> Result<(), TransactionError> {
        let got = config.map(|c| c.phase).unwrap_or_default();
        if got != expected {
            return Err(ShardError::PhaseOutOfOrder { expected, got }.into());
        }
        Ok(())
    }

    /// Phase 1: splits `initial_percent` of the target supply over the
    /// product's recorded data contributors by credit weight, with the lab
    /// participating at `lab_credit_basis`, and mints the platform its own
    /// percentage. Sets the transfer-lock deadline.
    #[allow(clippy::too_many_arguments)]
    pub fn distribute_initial(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
        target_supply: u64,
        lab_credit_basis: u64,
        lock_duration_secs: u64,
        initial_percent: u8,
        platform_percent: u8,
        lab_holder: &Principal,
        platform_holder: &Principal,
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        let product = ProductCatalog::product(state, uid)?;
        if product.owner != ctx.caller {
            return Err(ProductError::OnlyCreator.into());
        }

        if target_supply == 0 {
            return Err(ShardError::ZeroTargetSupply.into());
        }
        if initial_percent == 0 {
            return Err(ShardError::ZeroPercent.into());
        }
        if lock_duration_secs == 0 {
            return Err(ShardError::ZeroLockDuration.into());
        }
        if initial_percent > 100 || u16::from(initial_percent) + u16::from(platform_percent) > 100
        {
            return Err(ShardError::PercentOverflow.into());
        }
        Self::expect_phase(ShardVault::config(state, uid)?.as_ref(), SharePhase::Uninitialized)?;

        // Resolve each recorded hash to its contributor and credit weight.
        let mut contributors: Vec<(Principal, u64)> = Vec::with_capacity(product.data_hashes.len());
        let mut total_credit = u128::from(lab_credit_basis);
        for hash in &product.data_hashes {
            let credit = ProductCatalog::data_credit(state, hash, uid)?;
            let holder = ProductCatalog::data_owner_principal(state, hash)?
                .ok_or(DataError::UnknownData)?;
            total_credit += u128::from(credit);
            contributors.push((holder, credit));
        }
        if total_credit == 0 {
            return Err(ShardError::ZeroCredit.into());
        }

        let initial_pool = Self::percent_pool(target_supply, initial_percent);
        let vault = ShardVault;
        let mut minted: u64 = 0;

        for (holder, credit) in &contributors {
            let amount = Self::percent_share(initial_pool, *credit, total_credit);
            if amount > 0 {
                vault.mint(state, uid, holder, amount)?;
                minted += amount;
            }
        }

        let lab_amount = Self::percent_share(initial_pool, lab_credit_basis, total_credit);
        if lab_amount > 0 {
            vault.mint(state, uid, lab_holder, lab_amount)?;
            minted += lab_amount;
        }

        let platform_amount = Self::percent_pool(target_supply, platform_percent);
        if platform_amount > 0 {
            vault.mint(state, uid, platform_holder, platform_amount)?;
            minted += platform_amount;
        }

        if minted > target_supply {
            return Err(ShardError::MintExceedsTarget.into());
        }

        let config = ShardConfig {
            target_supply,
            initial_percent,
            platform_percent,
            future_percent: 0,
            lock_deadline: ctx.now + lock_duration_secs,
            minted_so_far: minted,
            supply_snapshot: None,
            phase: SharePhase::InitialDistributed,
        };
        store::put_record(state, &ShardVault::config_key(uid), &config)?;

        log::info!(
            "product {} initial distribution: {} of {} minted, locked until {}",
            uid,
            minted,
            target_supply,
            config.lock_deadline
        );
        Ok(())
    }

    /// Phase 2: splits `future_percent` of the target supply over the
    /// supplied `(credits, holders)` pairs with the same truncating rule.
    pub fn distribute_future(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
        future_percent: u8,
        credits: &[u64],
        holders: &[Principal],
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        let mut config =
            ShardVault::config(state, uid)?.ok_or(ShardError::UnknownConfig(uid))?;
        Self::expect_phase(Some(&config), SharePhase::InitialDistributed)?;

        let product = ProductCatalog::product(state, uid)?;
        if product.owner != ctx.caller {
            return Err(ProductError::OnlyCreator.into());
        }

        if credits.len() != holders.len() {
            return Err(ShardError::LengthMismatch {
                credits: credits.len(),
                holders: holders.len(),
            }
            .into());
        }
        if future_percent == 0 {
            return Err(ShardError::ZeroPercent.into());
        }
        let percent_sum = u16::from(config.initial_percent)
            + u16::from(config.platform_percent)
            + u16::from(config.future_percent)
            + u16::from(future_percent);
        if percent_sum > 100 {
            return Err(ShardError::PercentOverflow.into());
        }

        let total_credit: u128 = credits.iter().map(|c| u128::from(*c)).sum();
        if total_credit == 0 {
            return Err(ShardError::ZeroCredit.into());
        }

        let pool = Self::percent_pool(config.target_supply, future_percent);
        let vault = ShardVault;
        let mut minted = config.minted_so_far;

        for (holder, credit) in holders.iter().zip(credits) {
            let amount = Self::percent_share(pool, *credit, total_credit);
            if amount > 0 {
                vault.mint(state, uid, holder, amount)?;
                minted += amount;
            }
        }
        if minted > config.target_supply {
            return Err(ShardError::MintExceedsTarget.into());
        }

        config.minted_so_far = minted;
        config.future_percent += future_percent;
        config.phase = SharePhase::FutureDistributed;
        store::put_record(state, &ShardVault::config_key(uid), &config)?;

        log::info!(
            "product {} future distribution: {} of {} minted",
            uid,
            minted,
            config.target_supply
        );
        Ok(())
    }

    /// Terminal phase: mints the exact residual supply to `recipient` and
    /// records the supply snapshot the profit engine computes against.
    pub fn mint_remaining(
        &self,
        state: &mut dyn StateAccess,
        _ctx: &TxContext,
        uid: TokenId,
        recipient: &Principal,
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        let mut config =
            ShardVault::config(state, uid)?.ok_or(ShardError::UnknownConfig(uid))?;
        Self::expect_phase(Some(&config), SharePhase::FutureDistributed)?;

        let remaining = config.target_supply - config.minted_so_far;
        if remaining > 0 {
            ShardVault.mint(state, uid, recipient, remaining)?;
        }

        config.minted_so_far = config.target_supply;
        config.supply_snapshot = Some(config.target_supply);
        config.phase = SharePhase::RemainingMinted;
        store::put_record(state, &ShardVault::config_key(uid), &config)?;

        log::info!(
            "product {} issuance complete: residual {} minted to {}",
            uid,
            remaining,
            recipient
        );
        Ok(())
    }

    /// The exact shard supply minted so far for a product.
    pub fn total_shard_supply(
        state: &dyn StateAccess,
        uid: TokenId,
    ) -> Result<u64, TransactionError> {
        Ok(ShardVault::config(state, uid)?
            .map(|c| c.minted_so_far)
            .unwrap_or(0))
    }

    pub fn config(
        state: &dyn StateAccess,
        uid: TokenId,
    ) -> Result<Option<ShardConfig>, TransactionError> {
        ShardVault::config(state, uid)
    }
}
