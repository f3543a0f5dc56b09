//! Shared fixtures for the integration tests.
//!
//! Every test gets its own on-disk database in a temp directory; pooled
//! connections to an in-memory database would each see a different
//! database, which the concurrency tests cannot tolerate.

#![allow(dead_code)]

use tempfile::TempDir;

use cyberledger::ledger::lessons::{self, Level, NewLesson};
use cyberledger::ledger::shop::{self, ItemEffect, NewShopItem};
use cyberledger::ledger::users::{self, NewUser};
use cyberledger::storage::{create_pool, get_connection, DbPool};

/// Fresh pool over a temp-dir database. Keep the `TempDir` alive for the
/// duration of the test.
pub fn test_pool() -> (TempDir, DbPool) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cyberbot.db");
    let pool = create_pool(path.to_str().unwrap()).unwrap();
    (dir, pool)
}

/// Register a user with a generated first name, no referral
pub fn register(pool: &DbPool, user_id: i64) {
    let mut conn = get_connection(pool).unwrap();
    let outcome = users::register(
        &mut conn,
        &NewUser {
            user_id,
            first_name: Some(format!("user{}", user_id)),
            ..Default::default()
        },
        None,
    )
    .unwrap();
    assert_ne!(outcome, users::RegisterOutcome::AlreadyRegistered);
}

/// Insert a beginner lesson with the given reward, returning its id
pub fn add_lesson(pool: &DbPool, points_reward: i64) -> i64 {
    let conn = get_connection(pool).unwrap();
    lessons::insert_lesson(
        &conn,
        &NewLesson {
            title_ar: "درس".to_string(),
            title_en: "Lesson".to_string(),
            content_ar: "محتوى".to_string(),
            content_en: "Content".to_string(),
            level: Level::Beginner,
            points_reward,
            is_premium: false,
        },
    )
    .unwrap()
}

/// Insert a shop item, returning its id
pub fn add_item(pool: &DbPool, price_points: i64, price_usd: f64, effect: ItemEffect) -> i64 {
    let conn = get_connection(pool).unwrap();
    shop::insert_item(
        &conn,
        &NewShopItem {
            name_ar: "عنصر".to_string(),
            name_en: "Item".to_string(),
            description_ar: None,
            description_en: None,
            price_points,
            price_usd,
            category: "test".to_string(),
            effect,
        },
    )
    .unwrap()
}
