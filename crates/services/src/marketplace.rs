//! The shard marketplace: listings, sales, and admin-signed coupons.

use crate::admin::AdminRegistry;
use crate::authorizer::SignatureAuthorizer;
use crate::store;
use meridian_api::state::StateAccess;
use meridian_api::token::{SettlementLedger, ShardLedger};
use meridian_api::TxContext;
use meridian_crypto::message;
use meridian_types::error::{AdminError, MarketError, ShardError, TokenError, TransactionError};
use meridian_types::keys::MARKET_LISTING_PREFIX;
use meridian_types::records::{Listing, ListingStatus};
use meridian_types::{Principal, TokenId};

/// Halt-flag name for this service.
pub const SERVICE_ID: &str = "market";

fn listing_key(uid: TokenId, seller: &Principal) -> Vec<u8> {
    [
        MARKET_LISTING_PREFIX,
        &uid.to_le_bytes()[..],
        b"::",
        seller.as_ref(),
    ]
    .concat()
}

fn active_listing(
    state: &dyn StateAccess,
    uid: TokenId,
    seller: &Principal,
) -> Result<Option<Listing>, TransactionError> {
    Ok(store::get_record::<Listing>(state, &listing_key(uid, seller))?
        .filter(|l| l.status == ListingStatus::Listed))
}

/// A seller's listed price, 0 when not listed.
pub fn shard_price(
    state: &dyn StateAccess,
    uid: TokenId,
    seller: &Principal,
) -> Result<u128, TransactionError> {
    Ok(store::get_record::<Listing>(state, &listing_key(uid, seller))?
        .map(|l| l.price_per_shard)
        .unwrap_or(0))
}

/// A seller's listing status for a product.
pub fn listing_status(
    state: &dyn StateAccess,
    uid: TokenId,
    seller: &Principal,
) -> Result<ListingStatus, TransactionError> {
    Ok(store::get_record::<Listing>(state, &listing_key(uid, seller))?
        .map(|l| l.status)
        .unwrap_or_default())
}

/// An admin-issued discount: basis points off the sale cost, authorized by
/// the admin's signature over the coupon schema and spent on use.
#[derive(Debug, Clone)]
pub struct Coupon {
    pub bps: u64,
    pub nonce: u64,
    pub signature: Vec<u8>,
}

/// Seller listings and coupon-aware sale execution. Sales settle through
/// the settlement ledger and move shards through the shard vault, so the
/// post-issuance transfer lock applies to purchases too.
#[derive(Debug, Clone)]
pub struct ShardMarketplace<Sh: ShardLedger, St: SettlementLedger> {
    domain: Principal,
    shards: Sh,
    settlement: St,
}

impl<Sh: ShardLedger, St: SettlementLedger> ShardMarketplace<Sh, St> {
    pub fn new(domain: Principal, shards: Sh, settlement: St) -> Self {
        Self {
            domain,
            shards,
            settlement,
        }
    }

    pub fn domain(&self) -> Principal {
        self.domain
    }

    /// Lists the caller's shards of `uid` at `price_per_shard`.
    pub fn list_shards(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
        price_per_shard: u128,
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        if active_listing(state, uid, &ctx.caller)?.is_some() {
            return Err(MarketError::AlreadyListed.into());
        }
        if price_per_shard == 0 {
            return Err(MarketError::ZeroPrice.into());
        }
        if self.shards.balance_of(state, uid, &ctx.caller)? == 0 {
            return Err(ShardError::InsufficientBalance.into());
        }

        let listing = Listing {
            seller: ctx.caller,
            product_uid: uid,
            price_per_shard,
            status: ListingStatus::Listed,
        };
        store::put_record(state, &listing_key(uid, &ctx.caller), &listing)?;
        log::debug!(
            "{} listed product {} shards at {}",
            ctx.caller,
            uid,
            price_per_shard
        );
        Ok(())
    }

    /// Re-prices the caller's active listing.
    pub fn update_listing(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
        price_per_shard: u128,
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        let mut listing =
            active_listing(state, uid, &ctx.caller)?.ok_or(MarketError::NotListed)?;
        if price_per_shard == 0 {
            return Err(MarketError::ZeroPrice.into());
        }
        listing.price_per_shard = price_per_shard;
        store::put_record(state, &listing_key(uid, &ctx.caller), &listing)
    }

    /// Takes the caller's listing off the market.
    pub fn cancel_listing(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
    ) -> Result<(), TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        let mut listing =
            active_listing(state, uid, &ctx.caller)?.ok_or(MarketError::NotListed)?;
        listing.price_per_shard = 0;
        listing.status = ListingStatus::Delisted;
        store::put_record(state, &listing_key(uid, &ctx.caller), &listing)
    }

    /// Buys `amount` shards from `seller`'s listing, optionally at a
    /// coupon discount. Returns the settled cost.
    pub fn buy_shards(
        &self,
        state: &mut dyn StateAccess,
        ctx: &TxContext,
        uid: TokenId,
        seller: &Principal,
        amount: u64,
        coupon: Option<&Coupon>,
    ) -> Result<u128, TransactionError> {
        AdminRegistry::ensure_active(state, SERVICE_ID)?;

        let listing = active_listing(state, uid, seller)?.ok_or(MarketError::NotListed)?;
        if amount == 0 {
            return Err(MarketError::ZeroShardAmount.into());
        }
        if self.shards.balance_of(state, uid, seller)? < amount {
            return Err(ShardError::InsufficientBalance.into());
        }

        let mut cost = u128::from(amount)
            .checked_mul(listing.price_per_shard)
            .ok_or(TokenError::BalanceOverflow)?;

        if let Some(coupon) = coupon {
            let admin =
                AdminRegistry::admin(state)?.ok_or(AdminError::AdminNotConfigured)?;
            let digest =
                message::coupon_digest(&admin, &ctx.caller, &self.domain, coupon.bps, coupon.nonce);
            SignatureAuthorizer::verify(state, &admin, &digest, &coupon.signature)?;

            let discount = cost * u128::from(coupon.bps) / 10_000;
            cost = cost
                .checked_sub(discount)
                .ok_or(TokenError::BalanceOverflow)?;
        }

        self.settlement.transfer(state, &ctx.caller, seller, cost)?;
        self.shards
            .transfer(state, ctx, uid, seller, &ctx.caller, amount)?;

        log::info!(
            "{} bought {} shards of product {} from {} for {}",
            ctx.caller,
            amount,
            uid,
            seller,
            cost
        );
        Ok(cost)
    }
}
