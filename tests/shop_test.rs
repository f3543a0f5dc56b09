mod common;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use cyberledger::gateway::{CheckoutSession, GatewayError, PaymentGateway};
use cyberledger::ledger::points;
use cyberledger::ledger::shop::ShopItem;
use cyberledger::ledger::shop::{self, ItemEffect, PaymentMethod, PurchaseStatus};
use cyberledger::ledger::users;
use cyberledger::storage::get_connection;
use cyberledger::LedgerError;

#[test]
fn test_points_purchase_debits_and_confirms() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);
    let item_id = common::add_item(&pool, 50, 0.0, ItemEffect::None);

    let mut conn = get_connection(&pool).unwrap();
    points::earn(&mut conn, 1, 90, "top-up").unwrap(); // balance 100

    let purchase = shop::record_points_purchase(&mut conn, 1, item_id).unwrap();

    assert_eq!(purchase.status, PurchaseStatus::Confirmed);
    assert_eq!(purchase.payment_method, PaymentMethod::Points);
    assert_eq!(purchase.amount_points, 50);
    assert_eq!(points::balance(&conn, 1).unwrap(), 50);

    let listed = shop::user_purchases(&conn, 1).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, purchase.id);
}

#[test]
fn test_points_purchase_with_insufficient_balance_leaves_no_row() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1); // balance 10
    let item_id = common::add_item(&pool, 50, 0.0, ItemEffect::None);

    let mut conn = get_connection(&pool).unwrap();
    let err = shop::record_points_purchase(&mut conn, 1, item_id).unwrap_err();

    assert!(matches!(
        err,
        LedgerError::InsufficientBalance {
            required: 50,
            available: 10,
        }
    ));
    assert_eq!(points::balance(&conn, 1).unwrap(), 10);
    assert!(shop::user_purchases(&conn, 1).unwrap().is_empty());
}

#[test]
fn test_item_without_points_price_rejects_points_payment() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);
    let item_id = common::add_item(&pool, 0, 2.99, ItemEffect::GrantPoints { amount: 100 });

    let mut conn = get_connection(&pool).unwrap();
    assert!(matches!(
        shop::record_points_purchase(&mut conn, 1, item_id),
        Err(LedgerError::NotPurchasableWithPoints(_))
    ));
}

#[test]
fn test_vip_item_effect_is_applied() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);
    let item_id = common::add_item(&pool, 500, 9.99, ItemEffect::GrantVip { days: 30 });

    let mut conn = get_connection(&pool).unwrap();
    points::earn(&mut conn, 1, 490, "top-up").unwrap(); // balance 500

    shop::record_points_purchase(&mut conn, 1, item_id).unwrap();

    let user = users::get_user(&conn, 1).unwrap().unwrap();
    assert!(user.is_vip);
    assert!(user.vip_expires.is_some());
    assert_eq!(user.points, 0);
}

#[test]
fn test_card_purchase_starts_pending_and_grants_nothing() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);
    let item_id = common::add_item(&pool, 0, 2.99, ItemEffect::GrantPoints { amount: 100 });

    let mut conn = get_connection(&pool).unwrap();
    let purchase = shop::begin_card_purchase(&mut conn, 1, item_id).unwrap();

    assert_eq!(purchase.status, PurchaseStatus::Pending);
    assert_eq!(purchase.payment_method, PaymentMethod::Card);
    assert_eq!(purchase.amount_usd, 2.99);
    // Not confirmed yet: no points granted
    assert_eq!(points::balance(&conn, 1).unwrap(), 10);
}

#[test]
fn test_confirm_applies_effect_exactly_once() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);
    let item_id = common::add_item(&pool, 0, 2.99, ItemEffect::GrantPoints { amount: 100 });

    let mut conn = get_connection(&pool).unwrap();
    let purchase = shop::begin_card_purchase(&mut conn, 1, item_id).unwrap();

    let confirmed = shop::confirm_purchase(&mut conn, &purchase.id).unwrap();
    assert_eq!(confirmed.status, PurchaseStatus::Confirmed);
    assert_eq!(points::balance(&conn, 1).unwrap(), 110);

    // Confirmed rows are terminal; a replayed confirmation changes nothing
    let err = shop::confirm_purchase(&mut conn, &purchase.id).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidTransition {
            from: PurchaseStatus::Confirmed,
            to: PurchaseStatus::Confirmed,
        }
    ));
    assert_eq!(points::balance(&conn, 1).unwrap(), 110);
}

#[test]
fn test_failed_and_expired_purchases_grant_nothing() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);
    let item_id = common::add_item(&pool, 0, 2.99, ItemEffect::GrantPoints { amount: 100 });

    let mut conn = get_connection(&pool).unwrap();

    let failed = shop::begin_card_purchase(&mut conn, 1, item_id).unwrap();
    shop::fail_purchase(&mut conn, &failed.id).unwrap();

    let expired = shop::begin_card_purchase(&mut conn, 1, item_id).unwrap();
    shop::expire_purchase(&mut conn, &expired.id).unwrap();

    assert_eq!(points::balance(&conn, 1).unwrap(), 10);

    // Terminal rows reject every further transition
    assert!(matches!(
        shop::confirm_purchase(&mut conn, &failed.id),
        Err(LedgerError::InvalidTransition { .. })
    ));
    assert!(matches!(
        shop::expire_purchase(&mut conn, &expired.id),
        Err(LedgerError::InvalidTransition { .. })
    ));
}

#[test]
fn test_unknown_item_and_purchase_ids() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);

    let mut conn = get_connection(&pool).unwrap();
    assert!(matches!(
        shop::record_points_purchase(&mut conn, 1, 999),
        Err(LedgerError::ItemNotFound(999))
    ));
    assert!(matches!(
        shop::confirm_purchase(&mut conn, "no-such-purchase"),
        Err(LedgerError::PurchaseNotFound(_))
    ));
}

struct FakeGateway;

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout(
        &self,
        user_id: i64,
        item: &ShopItem,
        purchase_id: &str,
    ) -> Result<CheckoutSession, GatewayError> {
        Ok(CheckoutSession {
            purchase_id: purchase_id.to_string(),
            url: format!("https://pay.example/{user_id}/{}", item.id),
        })
    }
}

#[tokio::test]
async fn test_card_flow_through_gateway_settles_on_confirm() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);
    let item_id = common::add_item(&pool, 0, 9.99, ItemEffect::GrantVip { days: 30 });

    let mut conn = get_connection(&pool).unwrap();
    let item = shop::get_item(&conn, item_id).unwrap().unwrap();
    let purchase = shop::begin_card_purchase(&mut conn, 1, item_id).unwrap();

    let session = FakeGateway
        .create_checkout(1, &item, &purchase.id)
        .await
        .unwrap();
    assert_eq!(session.purchase_id, purchase.id);

    // The gateway reported success; settle and apply the effect.
    shop::confirm_purchase(&mut conn, &session.purchase_id).unwrap();
    let user = users::get_user(&conn, 1).unwrap().unwrap();
    assert!(user.is_vip);
}

#[test]
fn test_items_by_category_skips_unavailable() {
    let (_dir, pool) = common::test_pool();
    let cheap = common::add_item(&pool, 100, 0.0, ItemEffect::None);
    let pricey = common::add_item(&pool, 300, 0.0, ItemEffect::None);

    let conn = get_connection(&pool).unwrap();
    conn.execute(
        "UPDATE shop_items SET is_available = 0 WHERE id = ?1",
        [pricey],
    )
    .unwrap();

    let items = shop::items_by_category(&conn, "test").unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, cheap);
}
