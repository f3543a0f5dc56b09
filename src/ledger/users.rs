//! User accounts: registration (with referral handling), profile reads,
//! newsletter flags, VIP expiry and the leaderboard.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::core::config;
use crate::core::error::{LedgerError, LedgerResult};
use crate::ledger::points;
use crate::storage::db::DbConnection;

/// A user row
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Preferred language: "ar" or "en"
    pub language: String,
    pub points: i64,
    pub level: String,
    pub registration_date: String,
    pub total_lessons_completed: i64,
    pub referral_code: Option<String>,
    pub referred_by: Option<i64>,
    pub is_vip: bool,
    pub vip_expires: Option<String>,
    pub newsletter_subscribed: bool,
}

/// Profile fields captured at registration
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Defaults to "ar" when absent
    pub language: Option<String>,
}

/// Result of a registration attempt. Re-registering is a benign no-op,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered {
        welcome_points: i64,
        referred_by: Option<i64>,
    },
    AlreadyRegistered,
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        username: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        language: row.get(4)?,
        points: row.get(5)?,
        level: row.get(6)?,
        registration_date: row.get(7)?,
        total_lessons_completed: row.get(8)?,
        referral_code: row.get(9)?,
        referred_by: row.get(10)?,
        is_vip: row.get::<_, i64>(11)? != 0,
        vip_expires: row.get(12)?,
        newsletter_subscribed: row.get::<_, i64>(13)? != 0,
    })
}

const USER_COLUMNS: &str = "user_id, username, first_name, last_name, language, points, level, \
     registration_date, total_lessons_completed, referral_code, referred_by, is_vip, \
     vip_expires, newsletter_subscribed";

/// Derive a short uppercase referral code from a fresh UUID
fn generate_referral_code() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    uuid[..config::referral::CODE_LENGTH].to_uppercase()
}

/// Register a new user
///
/// Grants the welcome bonus (plus the referred extra when a valid referral
/// code resolves to another user) and rewards the referrer. The user row,
/// both ledger entries and the referral record are written in one
/// transaction. Registering an existing user changes nothing and returns
/// [`RegisterOutcome::AlreadyRegistered`].
pub fn register(
    conn: &mut DbConnection,
    new_user: &NewUser,
    referral_code: Option<&str>,
) -> LedgerResult<RegisterOutcome> {
    let tx = conn.transaction()?;

    let exists: Option<i64> = tx
        .query_row(
            "SELECT user_id FROM users WHERE user_id = ?1",
            params![new_user.user_id],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_some() {
        return Ok(RegisterOutcome::AlreadyRegistered);
    }

    // A referral code that does not resolve (or points back at the user)
    // is silently ignored; registration still proceeds.
    let referrer = match referral_code {
        Some(code) => tx
            .query_row(
                "SELECT user_id FROM users WHERE referral_code = ?1",
                params![code],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .filter(|id| *id != new_user.user_id),
        None => None,
    };

    let welcome_points = config::rewards::WELCOME_POINTS
        + if referrer.is_some() {
            config::rewards::REFERRED_EXTRA_POINTS
        } else {
            0
        };

    let language = new_user.language.as_deref().unwrap_or("ar");
    tx.execute(
        "INSERT INTO users (user_id, username, first_name, last_name, language, referral_code, referred_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            new_user.user_id,
            new_user.username,
            new_user.first_name,
            new_user.last_name,
            language,
            generate_referral_code(),
            referrer,
        ],
    )?;

    points::credit(&tx, new_user.user_id, welcome_points, "Welcome bonus")?;

    if let Some(referrer_id) = referrer {
        points::credit(
            &tx,
            referrer_id,
            config::rewards::REFERRER_POINTS,
            &format!("Referral bonus for user {}", new_user.user_id),
        )?;
        tx.execute(
            "INSERT INTO referrals (referrer_id, referred_id, points_awarded) VALUES (?1, ?2, ?3)",
            params![referrer_id, new_user.user_id, config::rewards::REFERRER_POINTS],
        )?;
    }

    tx.commit()?;

    log::info!(
        "Registered user {} (welcome: {}, referrer: {:?})",
        new_user.user_id,
        welcome_points,
        referrer
    );

    Ok(RegisterOutcome::Registered {
        welcome_points,
        referred_by: referrer,
    })
}

/// Fetch a user by id
pub fn get_user(conn: &DbConnection, user_id: i64) -> LedgerResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS),
            params![user_id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

/// Resolve a referral code to its owner
pub fn find_user_by_referral_code(
    conn: &DbConnection,
    referral_code: &str,
) -> LedgerResult<Option<User>> {
    let user = conn
        .query_row(
            &format!(
                "SELECT {} FROM users WHERE referral_code = ?1",
                USER_COLUMNS
            ),
            params![referral_code],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

/// Change a user's preferred language ("ar"/"en")
pub fn set_language(conn: &DbConnection, user_id: i64, language: &str) -> LedgerResult<()> {
    let updated = conn.execute(
        "UPDATE users SET language = ?1 WHERE user_id = ?2",
        params![language, user_id],
    )?;
    if updated == 0 {
        return Err(LedgerError::UserNotFound(user_id));
    }
    Ok(())
}

/// Toggle the newsletter subscription flag
pub fn set_newsletter(conn: &DbConnection, user_id: i64, subscribed: bool) -> LedgerResult<()> {
    let updated = conn.execute(
        "UPDATE users SET newsletter_subscribed = ?1 WHERE user_id = ?2",
        params![subscribed as i64, user_id],
    )?;
    if updated == 0 {
        return Err(LedgerError::UserNotFound(user_id));
    }
    Ok(())
}

/// Ids of all users who still receive the newsletter
pub fn newsletter_subscribers(conn: &DbConnection) -> LedgerResult<Vec<i64>> {
    let mut stmt =
        conn.prepare("SELECT user_id FROM users WHERE newsletter_subscribed = 1 ORDER BY user_id")?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row?);
    }
    Ok(ids)
}

/// One leaderboard row
#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub points: i64,
    pub total_lessons_completed: i64,
}

/// Top users by points; ties are broken by completed lessons
pub fn leaderboard(conn: &DbConnection, limit: i64) -> LedgerResult<Vec<LeaderboardEntry>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, first_name, points, total_lessons_completed FROM users
         ORDER BY points DESC, total_lessons_completed DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(LeaderboardEntry {
            user_id: row.get(0)?,
            first_name: row.get(1)?,
            points: row.get(2)?,
            total_lessons_completed: row.get(3)?,
        })
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

/// Mark a user as VIP for `days` more days
///
/// Extends from the current expiry when the VIP period is still running,
/// otherwise from now. Does not open a transaction; the caller already
/// holds one.
pub(crate) fn grant_vip(conn: &Connection, user_id: i64, days: i64) -> LedgerResult<()> {
    let updated = conn.execute(
        "UPDATE users SET is_vip = 1,
            vip_expires = datetime(
                CASE WHEN vip_expires IS NOT NULL AND vip_expires > datetime('now')
                     THEN vip_expires ELSE datetime('now') END,
                '+' || ?1 || ' days')
         WHERE user_id = ?2",
        params![days, user_id],
    )?;
    if updated == 0 {
        return Err(LedgerError::UserNotFound(user_id));
    }
    Ok(())
}

/// Demote users whose VIP period has ended
///
/// # Returns
///
/// Returns the number of demoted users.
pub fn expire_vip(conn: &DbConnection) -> LedgerResult<usize> {
    let count = conn.execute(
        "UPDATE users SET is_vip = 0, vip_expires = NULL
         WHERE is_vip = 1
         AND vip_expires IS NOT NULL
         AND vip_expires < datetime('now')",
        [],
    )?;

    if count > 0 {
        log::info!("Expired {} VIP membership(s)", count);
    }

    Ok(count)
}
