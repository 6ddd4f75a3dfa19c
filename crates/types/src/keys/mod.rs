//! Defines constants for well-known state keys.
//!
//! These constants are the single source of truth for the keys under which
//! services persist their records. Using them prevents typos and keeps the
//! key space consistent across services that read each other's state.

use crate::ids::{Principal, TokenId};

/// The state key for the administrative principal.
pub const SYSTEM_ADMIN_KEY: &[u8] = b"system::admin";
/// The state key prefix for per-service halt flags.
pub const SYSTEM_HALT_PREFIX: &[u8] = b"system::halted::";

/// The state key prefix for consumed authorization digests.
pub const AUTH_DIGEST_PREFIX: &[u8] = b"auth::digest::";

/// The state key for the next identity id.
pub const IDENTITY_NEXT_ID_KEY: &[u8] = b"identity::next_id";
/// The state key prefix for identity records, keyed by id.
pub const IDENTITY_RECORD_PREFIX: &[u8] = b"identity::token::";
/// The state key prefix for the principal -> identity id index.
pub const IDENTITY_OWNER_PREFIX: &[u8] = b"identity::owner::";

/// The state key prefix for the data hash -> owner identity index.
pub const DATA_OWNER_PREFIX: &[u8] = b"data::owner::";
/// The state key prefix for an identity's ordered hash sequence.
pub const DATA_INDEX_PREFIX: &[u8] = b"data::index::";
/// The state key prefix for usage permissions, keyed by (uid, hash).
pub const DATA_PERMISSION_PREFIX: &[u8] = b"data::permission::";

/// The state key prefix for product records, keyed by uid.
pub const PRODUCT_RECORD_PREFIX: &[u8] = b"product::record::";
/// The state key prefix for per-(uid, hash) credit weights.
pub const PRODUCT_CREDIT_PREFIX: &[u8] = b"product::credit::";

/// The state key prefix for per-product issuance configuration.
pub const SHARD_CONFIG_PREFIX: &[u8] = b"shards::config::";
/// The state key prefix for per-(uid, holder) shard balances.
pub const SHARD_BALANCE_PREFIX: &[u8] = b"shards::balance::";

/// The state key prefix for per-product earning ledgers.
pub const EARNING_RECORD_PREFIX: &[u8] = b"profit::earning::";
/// The state key prefix for per-(holder, uid) high-water marks.
pub const EARNING_POINT_PREFIX: &[u8] = b"profit::point::";

/// The state key prefix for settlement-asset balances.
pub const TOKEN_BALANCE_PREFIX: &[u8] = b"token::balance::";

/// The state key prefix for distributor agreement records.
pub const AGREEMENT_RECORD_PREFIX: &[u8] = b"agreements::record::";

/// The state key prefix for marketplace listings, keyed by (uid, seller).
pub const MARKET_LISTING_PREFIX: &[u8] = b"market::listing::";

/// The state key for the next proposal id.
pub const PROPOSAL_NEXT_ID_KEY: &[u8] = b"proposals::next_id";
/// The state key prefix for proposal records, keyed by id.
pub const PROPOSAL_RECORD_PREFIX: &[u8] = b"proposals::record::";

/// Creates the canonical halt-flag key for a service name. The name is
/// lowercased to keep the key space deterministic.
pub fn halt_key<S: AsRef<str>>(service: S) -> Vec<u8> {
    let name = service.as_ref().to_ascii_lowercase();
    [SYSTEM_HALT_PREFIX, name.as_bytes()].concat()
}

/// Creates the key for a `(product uid, holder)` shard balance.
pub fn shard_balance_key(uid: TokenId, holder: &Principal) -> Vec<u8> {
    [
        SHARD_BALANCE_PREFIX,
        &uid.to_le_bytes(),
        b"::",
        holder.as_ref(),
    ]
    .concat()
}

/// Creates the key for a `(product uid, data hash)` permission entry.
/// The fixed-width uid leads so that variable-length hashes cannot alias.
pub fn permission_key(uid: TokenId, hash: &[u8]) -> Vec<u8> {
    [DATA_PERMISSION_PREFIX, &uid.to_le_bytes(), b"::", hash].concat()
}

/// Creates the key for a `(product uid, data hash)` credit weight.
pub fn product_credit_key(uid: TokenId, hash: &[u8]) -> Vec<u8> {
    [PRODUCT_CREDIT_PREFIX, &uid.to_le_bytes(), b"::", hash].concat()
}
