//! Typed builders for the protocol's signed-message schemas.
//!
//! Each builder packs its operation's fields in the fixed order below,
//! keccak-hashes them, and wraps the result in the recovery prefix. The
//! returned digest is what gets signed, what the authorizer recovers
//! against, and the key under which replay protection marks it consumed.
//!
//! Binding the full field tuple (not just a content hash) defeats
//! substitution of auxiliary parameters; binding the nonce defeats replay
//! of the same call; binding the service domain defeats replay against
//! another deployed instance.

use crate::digest::{concatenated_data_hash, recovery_digest, PackedMessage};
use meridian_types::{Bytes32, DataHash, Principal, TokenId};

/// `createIdentity`: [kyc?], owner, metadataURI, nonce, registry domain.
/// Signed by the identity owner.
pub fn create_identity_digest(
    owner: &Principal,
    kyc: Option<&Bytes32>,
    metadata_uri: &str,
    nonce: u64,
    domain: &Principal,
) -> Bytes32 {
    let mut message = PackedMessage::new();
    if let Some(kyc) = kyc {
        message = message.bytes32(kyc);
    }
    let hash = message
        .address(owner)
        .string(metadata_uri)
        .uint(u128::from(nonce))
        .address(domain)
        .finish();
    recovery_digest(&hash)
}

/// `submitData`: owner, dataHash, nonce, ledger domain. Signed by the data
/// owner.
pub fn submit_data_digest(
    owner: &Principal,
    data_hash: &[u8],
    nonce: u64,
    domain: &Principal,
) -> Bytes32 {
    let hash = PackedMessage::new()
        .address(owner)
        .bytes(data_hash)
        .uint(u128::from(nonce))
        .address(domain)
        .finish();
    recovery_digest(&hash)
}

/// `grantPermission`: owner, requesterId, dataHash, productUID, nonce,
/// expirationSecs, ledger domain. Signed by the data owner.
#[allow(clippy::too_many_arguments)]
pub fn grant_permission_digest(
    owner: &Principal,
    requester_identity: TokenId,
    data_hash: &[u8],
    product_uid: TokenId,
    nonce: u64,
    expiration_secs: u64,
    domain: &Principal,
) -> Bytes32 {
    let hash = PackedMessage::new()
        .address(owner)
        .uint(u128::from(requester_identity))
        .bytes(data_hash)
        .uint(u128::from(product_uid))
        .uint(u128::from(nonce))
        .uint(u128::from(expiration_secs))
        .address(domain)
        .finish();
    recovery_digest(&hash)
}

/// `distributorAgreement`: distributor, agreementHash, nonce, agreements
/// domain. Signed by the distributor.
pub fn distributor_agreement_digest(
    distributor: &Principal,
    agreement_hash: &[u8],
    nonce: u64,
    domain: &Principal,
) -> Bytes32 {
    let hash = PackedMessage::new()
        .address(distributor)
        .bytes(agreement_hash)
        .uint(u128::from(nonce))
        .address(domain)
        .finish();
    recovery_digest(&hash)
}

/// `couponAuthorization`: admin, user, marketplace domain, couponBps,
/// nonce. Signed by the admin.
pub fn coupon_digest(
    admin: &Principal,
    user: &Principal,
    domain: &Principal,
    coupon_bps: u64,
    nonce: u64,
) -> Bytes32 {
    let hash = PackedMessage::new()
        .address(admin)
        .address(user)
        .address(domain)
        .uint(u128::from(coupon_bps))
        .uint(u128::from(nonce))
        .finish();
    recovery_digest(&hash)
}

/// `productCreditAttestation`: productUID, nonce, productURI, attester,
/// commitment to the ordered hash list, credits, caller, catalog domain.
/// Signed by the configured attester.
#[allow(clippy::too_many_arguments)]
pub fn product_attestation_digest(
    product_uid: TokenId,
    nonce: u64,
    product_uri: &str,
    attester: &Principal,
    data_hashes: &[DataHash],
    credits: &[u64],
    caller: &Principal,
    domain: &Principal,
) -> Bytes32 {
    let hash = PackedMessage::new()
        .uint(u128::from(product_uid))
        .uint(u128::from(nonce))
        .string(product_uri)
        .address(attester)
        .bytes32(&concatenated_data_hash(data_hashes))
        .uint_list(credits)
        .address(caller)
        .address(domain)
        .finish();
    recovery_digest(&hash)
}
