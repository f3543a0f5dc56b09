mod common;

use pretty_assertions::assert_eq;

use cyberledger::ledger::points;
use cyberledger::ledger::referrals;
use cyberledger::ledger::users::{self, NewUser, RegisterOutcome};
use cyberledger::storage::get_connection;

#[test]
fn test_registration_grants_welcome_bonus() {
    let (_dir, pool) = common::test_pool();

    let mut conn = get_connection(&pool).unwrap();
    let outcome = users::register(
        &mut conn,
        &NewUser {
            user_id: 1,
            username: Some("alice".to_string()),
            first_name: Some("Alice".to_string()),
            ..Default::default()
        },
        None,
    )
    .unwrap();

    assert_eq!(
        outcome,
        RegisterOutcome::Registered {
            welcome_points: 10,
            referred_by: None,
        }
    );

    let user = users::get_user(&conn, 1).unwrap().unwrap();
    assert_eq!(user.points, 10);
    assert_eq!(user.language, "ar");
    assert!(user.newsletter_subscribed);
    assert!(user.referral_code.is_some());

    let entries = points::history(&conn, 1, None).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reason.as_deref(), Some("Welcome bonus"));
}

#[test]
fn test_repeat_registration_is_a_no_op() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);

    let mut conn = get_connection(&pool).unwrap();
    let before = users::get_user(&conn, 1).unwrap().unwrap();

    let outcome = users::register(
        &mut conn,
        &NewUser {
            user_id: 1,
            first_name: Some("Imposter".to_string()),
            ..Default::default()
        },
        None,
    )
    .unwrap();

    assert_eq!(outcome, RegisterOutcome::AlreadyRegistered);

    let after = users::get_user(&conn, 1).unwrap().unwrap();
    assert_eq!(after.points, before.points);
    assert_eq!(after.first_name, before.first_name);
    assert_eq!(points::history(&conn, 1, None).unwrap().len(), 1);
}

#[test]
fn test_referred_registration_rewards_both_sides() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);

    let mut conn = get_connection(&pool).unwrap();
    let referrer = users::get_user(&conn, 1).unwrap().unwrap();
    let code = referrer.referral_code.unwrap();

    let outcome = users::register(
        &mut conn,
        &NewUser {
            user_id: 2,
            ..Default::default()
        },
        Some(&code),
    )
    .unwrap();

    assert_eq!(
        outcome,
        RegisterOutcome::Registered {
            welcome_points: 30,
            referred_by: Some(1),
        }
    );

    // Referred user: welcome 10 + extra 20
    assert_eq!(points::balance(&conn, 2).unwrap(), 30);
    // Referrer: welcome 10 + referral 50
    assert_eq!(points::balance(&conn, 1).unwrap(), 60);

    let user = users::get_user(&conn, 2).unwrap().unwrap();
    assert_eq!(user.referred_by, Some(1));

    let stats = referrals::referral_stats(&conn, 1).unwrap();
    assert_eq!(
        stats,
        referrals::ReferralStats {
            total_referrals: 1,
            points_earned: 50,
        }
    );
    assert_eq!(referrals::referred_users(&conn, 1).unwrap(), vec![2]);
}

#[test]
fn test_unknown_referral_code_is_ignored() {
    let (_dir, pool) = common::test_pool();

    let mut conn = get_connection(&pool).unwrap();
    let outcome = users::register(
        &mut conn,
        &NewUser {
            user_id: 3,
            ..Default::default()
        },
        Some("NOSUCHCD"),
    )
    .unwrap();

    assert_eq!(
        outcome,
        RegisterOutcome::Registered {
            welcome_points: 10,
            referred_by: None,
        }
    );
    assert_eq!(points::balance(&conn, 3).unwrap(), 10);
}

#[test]
fn test_find_user_by_referral_code() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);

    let conn = get_connection(&pool).unwrap();
    let code = users::get_user(&conn, 1)
        .unwrap()
        .unwrap()
        .referral_code
        .unwrap();

    let found = users::find_user_by_referral_code(&conn, &code).unwrap();
    assert_eq!(found.map(|u| u.user_id), Some(1));
    assert!(users::find_user_by_referral_code(&conn, "ZZZZZZZZ")
        .unwrap()
        .is_none());
}

#[test]
fn test_set_language_and_newsletter() {
    let (_dir, pool) = common::test_pool();
    common::register(&pool, 1);
    common::register(&pool, 2);

    let conn = get_connection(&pool).unwrap();
    users::set_language(&conn, 1, "en").unwrap();
    users::set_newsletter(&conn, 2, false).unwrap();

    assert_eq!(users::get_user(&conn, 1).unwrap().unwrap().language, "en");
    assert_eq!(users::newsletter_subscribers(&conn).unwrap(), vec![1]);
}
