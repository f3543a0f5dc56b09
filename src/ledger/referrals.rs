//! Referral statistics. The referral rows themselves are written during
//! registration (see [`crate::ledger::users::register`]).

use rusqlite::params;

use crate::core::error::LedgerResult;
use crate::storage::db::DbConnection;

/// Aggregate referral numbers for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralStats {
    pub total_referrals: i64,
    pub points_earned: i64,
}

/// How many users this user referred and what it earned them
pub fn referral_stats(conn: &DbConnection, user_id: i64) -> LedgerResult<ReferralStats> {
    let stats = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(points_awarded), 0) FROM referrals WHERE referrer_id = ?1",
        params![user_id],
        |row| {
            Ok(ReferralStats {
                total_referrals: row.get(0)?,
                points_earned: row.get(1)?,
            })
        },
    )?;
    Ok(stats)
}

/// Ids of the users this user referred, oldest first
pub fn referred_users(conn: &DbConnection, user_id: i64) -> LedgerResult<Vec<i64>> {
    let mut stmt = conn
        .prepare("SELECT referred_id FROM referrals WHERE referrer_id = ?1 ORDER BY referral_date")?;
    let rows = stmt.query_map(params![user_id], |row| row.get(0))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row?);
    }
    Ok(ids)
}
