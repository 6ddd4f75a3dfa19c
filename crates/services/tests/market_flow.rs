//! End-to-end flows for the supplemented services: the attested product
//! variant, the shard marketplace with admin coupons, and distributor
//! agreements through the kernel boundary.

mod common;

use common::{signer, Harness, DAY};
use meridian_crypto::message;
use meridian_services::marketplace::{self, Coupon};
use meridian_services::product_catalog::CreditAttestation;
use meridian_types::error::ErrorCode;
use meridian_types::records::ListingStatus;
use meridian_types::DataHash;

const UID: u64 = 200;

/// Registers one data owner and the lab, permits one hash for `UID`.
fn permit_one_hash(h: &mut Harness) -> u64 {
    let owner = signer(1);
    let lab = signer(3);
    h.register(&owner).unwrap();
    let lab_id = h.register(&lab).unwrap();
    h.submit_data(&owner, b"hash-1").unwrap();
    h.grant_permission(&owner, &lab, lab_id, b"hash-1", UID, 2 * DAY)
        .unwrap();
    lab_id
}

/// Issues shards for `UID` so the platform holder can trade: target 1000,
/// initial 30% (owner credit 10, lab basis 10), platform 20%.
fn issue_shards(h: &mut Harness, lab_id: u64) {
    let lab = signer(3);
    let platform = signer(5);
    let hashes: Vec<DataHash> = vec![b"hash-1".to_vec()];
    h.create_product(&lab, lab_id, UID, &hashes, &[10]).unwrap();

    let ctx = h.ctx(lab.principal());
    h.kernel
        .execute(ctx, |svc, state, ctx| {
            svc.issuance.distribute_initial(
                state, ctx, UID, 1_000, 10, 2 * DAY, 30, 20,
                &lab.principal(), &platform.principal(),
            )
        })
        .unwrap();
    let ctx = h.ctx(lab.principal());
    h.kernel
        .execute(ctx, |svc, state, ctx| {
            svc.issuance
                .distribute_future(state, ctx, UID, 10, &[1], &[lab.principal()])
        })
        .unwrap();
    let ctx = h.ctx(lab.principal());
    h.kernel
        .execute(ctx, |svc, state, ctx| {
            svc.issuance
                .mint_remaining(state, ctx, UID, &platform.principal())
        })
        .unwrap();
}

#[test]
fn attested_creation_is_a_configuration_of_the_same_catalog() {
    let attester = signer(40);
    let mut h = Harness::new(Some(attester.principal()));
    let lab = signer(3);
    let lab_id = permit_one_hash(&mut h);

    let hashes: Vec<DataHash> = vec![b"hash-1".to_vec()];
    let credits = [10u64];
    let domain = h.kernel.view(|svc, _| Ok(svc.products.domain())).unwrap();

    // Without an attestation the call is refused outright.
    let err = h
        .create_product(&lab, lab_id, UID, &hashes, &credits)
        .unwrap_err();
    assert_eq!(err.code(), "PRODUCT_ATTESTATION_REQUIRED");

    // A signature from anyone but the configured attester is invalid.
    let impostor = signer(41);
    let digest = message::product_attestation_digest(
        UID,
        1,
        "/ProductURI",
        &attester.principal(),
        &hashes,
        &credits,
        &lab.principal(),
        &domain,
    );
    let forged = CreditAttestation {
        nonce: 1,
        signature: impostor.sign_digest(&digest).unwrap().to_vec(),
    };
    let ctx = h.ctx(lab.principal());
    let hashes_arg = hashes.clone();
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.products.create_product(
                state, ctx, lab_id, UID, "/ProductURI", &hashes_arg, &credits,
                Some(&forged),
            )
        })
        .unwrap_err();
    assert_eq!(err.code(), "AUTH_INVALID_SIGNATURE");

    // The genuine attestation passes every check.
    let attestation = CreditAttestation {
        nonce: 1,
        signature: attester.sign_digest(&digest).unwrap().to_vec(),
    };
    let ctx = h.ctx(lab.principal());
    let hashes_arg = hashes.clone();
    let att = attestation.clone();
    h.kernel
        .execute(ctx, |svc, state, ctx| {
            svc.products.create_product(
                state, ctx, lab_id, UID, "/ProductURI", &hashes_arg, &credits,
                Some(&att),
            )
        })
        .unwrap();

    // Exact resubmission dies on replay before any other check.
    let ctx = h.ctx(lab.principal());
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.products.create_product(
                state, ctx, lab_id, UID, "/ProductURI", &hashes, &credits,
                Some(&attestation),
            )
        })
        .unwrap_err();
    assert_eq!(err.code(), "AUTH_SIGNATURE_REUSED");
}

#[test]
fn listing_lifecycle_and_guards() {
    let mut h = Harness::new(None);
    let lab_id = permit_one_hash(&mut h);
    issue_shards(&mut h, lab_id);
    let platform = signer(5);
    let seller = platform.principal();

    // A holder without shards cannot list.
    let stranger = signer(9);
    let ctx = h.ctx(stranger.principal());
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market.list_shards(state, ctx, UID, 50)
        })
        .unwrap_err();
    assert_eq!(err.code(), "SHARD_INSUFFICIENT_BALANCE");

    // Zero prices are refused.
    let ctx = h.ctx(seller);
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| svc.market.list_shards(state, ctx, UID, 0))
        .unwrap_err();
    assert_eq!(err.code(), "MARKET_ZERO_PRICE");

    let ctx = h.ctx(seller);
    h.kernel
        .execute(ctx, |svc, state, ctx| svc.market.list_shards(state, ctx, UID, 50))
        .unwrap();
    h.kernel
        .view(|_, state| {
            assert_eq!(marketplace::shard_price(state, UID, &seller)?, 50);
            Ok(())
        })
        .unwrap();

    let ctx = h.ctx(seller);
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| svc.market.list_shards(state, ctx, UID, 50))
        .unwrap_err();
    assert_eq!(err.code(), "MARKET_ALREADY_LISTED");

    // Update, then cancel, then list again.
    let ctx = h.ctx(seller);
    h.kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market.update_listing(state, ctx, UID, 200)
        })
        .unwrap();
    let ctx = h.ctx(seller);
    h.kernel
        .execute(ctx, |svc, state, ctx| svc.market.cancel_listing(state, ctx, UID))
        .unwrap();
    h.kernel
        .view(|_, state| {
            assert_eq!(marketplace::shard_price(state, UID, &seller)?, 0);
            assert_eq!(
                marketplace::listing_status(state, UID, &seller)?,
                ListingStatus::Delisted
            );
            Ok(())
        })
        .unwrap();

    // Updating or cancelling without an active listing fails.
    let ctx = h.ctx(seller);
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market.update_listing(state, ctx, UID, 100)
        })
        .unwrap_err();
    assert_eq!(err.code(), "MARKET_NOT_LISTED");

    let ctx = h.ctx(seller);
    h.kernel
        .execute(ctx, |svc, state, ctx| svc.market.list_shards(state, ctx, UID, 50))
        .unwrap();
}

#[test]
fn sales_settle_with_and_without_coupons() {
    let mut h = Harness::new(None);
    let lab_id = permit_one_hash(&mut h);
    issue_shards(&mut h, lab_id);

    let platform = signer(5);
    let seller = platform.principal();
    let buyer = signer(8);
    let admin = h.admin.clone();
    h.fund(buyer.principal(), 200);

    let ctx = h.ctx(seller);
    h.kernel
        .execute(ctx, |svc, state, ctx| svc.market.list_shards(state, ctx, UID, 50))
        .unwrap();

    // Buying from someone who never listed fails.
    let ctx = h.ctx(buyer.principal());
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market
                .buy_shards(state, ctx, UID, &signer(9).principal(), 2, None)
        })
        .unwrap_err();
    assert_eq!(err.code(), "MARKET_NOT_LISTED");

    // Zero shard amounts fail.
    let ctx = h.ctx(buyer.principal());
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market.buy_shards(state, ctx, UID, &seller, 0, None)
        })
        .unwrap_err();
    assert_eq!(err.code(), "MARKET_ZERO_SHARD_AMOUNT");

    // A 200 bps coupon signed by the admin: 2 shards at 50 cost 98.
    let market_domain = h.kernel.view(|svc, _| Ok(svc.market.domain())).unwrap();
    let digest = message::coupon_digest(
        &admin.principal(),
        &buyer.principal(),
        &market_domain,
        200,
        1,
    );
    let coupon = Coupon {
        bps: 200,
        nonce: 1,
        signature: admin.sign_digest(&digest).unwrap().to_vec(),
    };

    let seller_before = h.settlement_balance(seller);
    let buyer_shards_before = h.shard_balance(UID, buyer.principal());
    let ctx = h.ctx(buyer.principal());
    let coupon_arg = coupon.clone();
    let cost = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market
                .buy_shards(state, ctx, UID, &seller, 2, Some(&coupon_arg))
        })
        .unwrap();
    assert_eq!(cost, 98);
    assert_eq!(h.settlement_balance(seller), seller_before + 98);
    assert_eq!(h.settlement_balance(buyer.principal()), 102);
    assert_eq!(h.shard_balance(UID, buyer.principal()), buyer_shards_before + 2);

    // The coupon is spent: replaying it fails.
    let ctx = h.ctx(buyer.principal());
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market.buy_shards(state, ctx, UID, &seller, 1, Some(&coupon))
        })
        .unwrap_err();
    assert_eq!(err.code(), "AUTH_SIGNATURE_REUSED");

    // A plain purchase at the listed price.
    let ctx = h.ctx(buyer.principal());
    let cost = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market.buy_shards(state, ctx, UID, &seller, 1, None)
        })
        .unwrap();
    assert_eq!(cost, 50);
    assert_eq!(h.settlement_balance(buyer.principal()), 52);

    // Funds gone: the next purchase overdraws and fails.
    let ctx = h.ctx(buyer.principal());
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market.buy_shards(state, ctx, UID, &seller, 2, None)
        })
        .unwrap_err();
    assert_eq!(err.code(), "TOKEN_INSUFFICIENT_BALANCE");
}

#[test]
fn marketplace_sales_respect_the_transfer_lock() {
    let mut h = Harness::new(None);
    let lab_id = permit_one_hash(&mut h);
    issue_shards(&mut h, lab_id);

    // The lab's allocation is small next to the platform's; selling more
    // than half of it in one sale during the lock window must fail.
    let lab = signer(3);
    let seller = lab.principal();
    let buyer = signer(8);
    h.fund(buyer.principal(), 10_000);

    let lab_balance = h.shard_balance(UID, seller);
    assert!(lab_balance > 0);

    let ctx = h.ctx(seller);
    h.kernel
        .execute(ctx, |svc, state, ctx| svc.market.list_shards(state, ctx, UID, 10))
        .unwrap();

    let ctx = h.ctx(buyer.principal());
    let err = h
        .kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market
                .buy_shards(state, ctx, UID, &seller, lab_balance / 2 + 1, None)
        })
        .unwrap_err();
    assert_eq!(err.code(), "SHARD_LOCK_PERIOD_ACTIVE");

    h.clock.advance(2 * DAY + 1);
    let ctx = h.ctx(buyer.principal());
    h.kernel
        .execute(ctx, |svc, state, ctx| {
            svc.market
                .buy_shards(state, ctx, UID, &seller, lab_balance, None)
        })
        .unwrap();
    assert_eq!(h.shard_balance(UID, seller), 0);
}

#[test]
fn distributor_agreements_flow_through_the_kernel() {
    let mut h = Harness::new(None);
    let distributor = signer(30);
    let principal = distributor.principal();
    let domain = h.kernel.view(|svc, _| Ok(svc.agreements.domain())).unwrap();

    let digest = message::distributor_agreement_digest(&principal, b"agreement", 1, &domain);
    let signature = distributor.sign_digest(&digest).unwrap();

    // Submitted by the platform admin on the distributor's behalf.
    let ctx = h.ctx(h.admin.principal());
    h.kernel
        .execute(ctx, |svc, state, ctx| {
            svc.agreements.create_agreement(
                state, ctx, &principal, b"agreement", 101, 100, 5, 20, 1, &signature,
            )
        })
        .unwrap();

    h.kernel
        .view(|_, state| {
            let record =
                meridian_services::agreement::DistributorRegistry::agreement(state, &principal)?
                    .unwrap();
            assert_eq!(record.total_units, 100);
            assert_eq!(record.distributor_percent, 20);
            Ok(())
        })
        .unwrap();
}
