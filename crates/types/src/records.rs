//! The records services persist in the state store.
//!
//! Every type here is written with the canonical SCALE codec (see
//! [`crate::codec`]) under a well-known key prefix (see [`crate::keys`]).
//! Records hold no behaviour; the services own all transition logic.

use crate::ids::{Bytes32, DataHash, Principal, Timestamp, TokenId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A registered pseudonymous identity. At most one live identity per
/// principal; ids are dense and start at 1.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: TokenId,
    pub owner: Principal,
    pub metadata_uri: String,
    /// Optional KYC commitment bound into the creation signature.
    pub kyc: Option<Bytes32>,
}

/// Status of a usage permission. The stored bit never flips back to
/// `None`; expiry is a read-time predicate over the deadline.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionStatus {
    #[default]
    None,
    Granted,
}

/// A time-boxed usage grant, keyed by `(data hash, product uid)`.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub status: PermissionStatus,
    pub requester_identity: TokenId,
    pub deadline: Timestamp,
}

impl Permission {
    /// The true permitted predicate: granted and not yet expired.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.status == PermissionStatus::Granted && now <= self.deadline
    }
}

/// A product assembled from permitted data hashes. Per-hash credit weights
/// live under their own keys so that linking new data never rewrites the
/// existing entries.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub uid: TokenId,
    pub owner: Principal,
    pub creator_identity: TokenId,
    pub uri: String,
    /// Append-only, in submission order.
    pub data_hashes: Vec<DataHash>,
    /// How many of `data_hashes` were present at creation.
    pub initial_data_count: u32,
}

/// Issuance phases. Transitions are strictly forward and each runs once.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SharePhase {
    #[default]
    Uninitialized,
    InitialDistributed,
    FutureDistributed,
    RemainingMinted,
}

/// Per-product share issuance configuration and progress.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShardConfig {
    pub target_supply: u64,
    pub initial_percent: u8,
    pub platform_percent: u8,
    /// Accumulated across `distribute_future` calls (exactly one today).
    pub future_percent: u8,
    /// Large transfers are restricted until this instant (inclusive).
    pub lock_deadline: Timestamp,
    /// Exact running total of minted shards. Truncation residue from the
    /// percentage splits is absorbed by the remaining mint, so this must
    /// never be approximated.
    pub minted_so_far: u64,
    /// Fixed total supply recorded at the `RemainingMinted` transition.
    /// Profit withdrawals compute percentages against this snapshot only.
    pub supply_snapshot: Option<u64>,
    pub phase: SharePhase,
}

/// Per-product earning ledger for the profit engine. Holder high-water
/// marks are stored under their own keys.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Earning {
    pub total_deposited: u128,
    pub total_withdrawn: u128,
}

/// A distributor's business agreement, stored against the distributor.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DistributorAgreement {
    pub distributor: Principal,
    pub agreement_hash: Vec<u8>,
    pub product_uid: TokenId,
    pub total_units: u64,
    pub unit_price: u128,
    pub distributor_percent: u8,
}

#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingStatus {
    #[default]
    Delisted,
    Listed,
}

/// A seller's marketplace listing for one product's shards.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub seller: Principal,
    pub product_uid: TokenId,
    pub price_per_shard: u128,
    pub status: ListingStatus,
}

/// A recorded proposal with its off-ledger voting outcome.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub id: u64,
    pub total_participants: u64,
    pub info: String,
    pub result: String,
}
