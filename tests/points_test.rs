mod common;

use pretty_assertions::assert_eq;

use cyberledger::ledger::points;
use cyberledger::reporting;
use cyberledger::storage::get_connection;
use cyberledger::LedgerError;

// Welcome bonus granted at registration (see the registration tests)
const WELCOME: i64 = 10;

#[test]
fn test_earn_increments_balance_and_appends_one_entry() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);

    let mut conn = get_connection(&pool).unwrap();
    let before = points::balance(&conn, 1).unwrap();
    let entries_before = points::history(&conn, 1, Some(100)).unwrap().len();

    points::earn(&mut conn, 1, 25, "Daily challenge").unwrap();

    assert_eq!(points::balance(&conn, 1).unwrap(), before + 25);

    let entries = points::history(&conn, 1, Some(100)).unwrap();
    assert_eq!(entries.len(), entries_before + 1);
    assert_eq!(entries[0].points, 25);
    assert_eq!(entries[0].transaction_type, "earned");
    assert_eq!(entries[0].reason.as_deref(), Some("Daily challenge"));
}

#[test]
fn test_earn_rejects_non_positive_amounts() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);

    let mut conn = get_connection(&pool).unwrap();
    assert!(matches!(
        points::earn(&mut conn, 1, 0, "zero"),
        Err(LedgerError::InvalidAmount(0))
    ));
    assert!(matches!(
        points::earn(&mut conn, 1, -5, "negative"),
        Err(LedgerError::InvalidAmount(-5))
    ));
    assert_eq!(points::balance(&conn, 1).unwrap(), WELCOME);
}

#[test]
fn test_earn_for_unknown_user_fails() {
    let (_dir, pool) = common::test_pool();

    let mut conn = get_connection(&pool).unwrap();
    assert!(matches!(
        points::earn(&mut conn, 42, 10, "ghost"),
        Err(LedgerError::UserNotFound(42))
    ));
}

#[test]
fn test_spend_within_balance() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);

    let mut conn = get_connection(&pool).unwrap();
    points::earn(&mut conn, 1, 90, "top-up").unwrap();
    points::spend(&mut conn, 1, 60, "AI chat").unwrap();

    assert_eq!(points::balance(&conn, 1).unwrap(), WELCOME + 90 - 60);

    let entries = points::history(&conn, 1, Some(1)).unwrap();
    assert_eq!(entries[0].points, -60);
    assert_eq!(entries[0].transaction_type, "spent");
}

#[test]
fn test_overspend_is_rejected_and_changes_nothing() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);

    let mut conn = get_connection(&pool).unwrap();
    let entries_before = points::history(&conn, 1, Some(100)).unwrap().len();

    let err = points::spend(&mut conn, 1, WELCOME + 1, "too much").unwrap_err();
    match err {
        LedgerError::InsufficientBalance {
            required,
            available,
        } => {
            assert_eq!(required, WELCOME + 1);
            assert_eq!(available, WELCOME);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(points::balance(&conn, 1).unwrap(), WELCOME);
    assert_eq!(
        points::history(&conn, 1, Some(100)).unwrap().len(),
        entries_before
    );
}

#[test]
fn test_spend_for_unknown_user_fails() {
    let (_dir, pool) = common::test_pool();

    let mut conn = get_connection(&pool).unwrap();
    assert!(matches!(
        points::spend(&mut conn, 7, 5, "ghost"),
        Err(LedgerError::UserNotFound(7))
    ));
}

#[test]
fn test_balance_always_matches_ledger_fold() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);
    common::register(&pool, 2);

    let mut conn = get_connection(&pool).unwrap();
    points::earn(&mut conn, 1, 50, "quiz").unwrap();
    points::spend(&mut conn, 1, 30, "chat").unwrap();
    points::earn(&mut conn, 2, 5, "quiz").unwrap();
    points::earn(&mut conn, 1, 12, "challenge").unwrap();
    points::spend(&mut conn, 2, 15, "chat").unwrap();

    for user_id in [1, 2] {
        assert_eq!(
            points::balance(&conn, user_id).unwrap(),
            points::recompute_balance(&conn, user_id).unwrap()
        );
    }
    assert!(reporting::ledger_drift(&conn).unwrap().is_empty());
}
