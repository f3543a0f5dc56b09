//! Point balance operations.
//!
//! `users.points` is a materialized view of `points_history`: every write
//! here touches both inside one SQLite transaction, so the sum of a user's
//! history rows always equals their stored balance. Spends use a single
//! conditional UPDATE, which makes concurrent overdrafts impossible.

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::{LedgerError, LedgerResult};
use crate::storage::db::DbConnection;

/// One row of a user's points history
#[derive(Debug, Clone)]
pub struct PointsEntry {
    /// Signed amount: positive for "earned", negative for "spent"
    pub points: i64,
    pub reason: Option<String>,
    pub transaction_type: String,
    pub date: String,
}

/// Increment the balance and append the matching "earned" history row.
///
/// Does not open a transaction; the caller already holds one.
pub(crate) fn credit(
    conn: &Connection,
    user_id: i64,
    amount: i64,
    reason: &str,
) -> LedgerResult<()> {
    let updated = conn.execute(
        "UPDATE users SET points = points + ?1 WHERE user_id = ?2",
        params![amount, user_id],
    )?;
    if updated == 0 {
        return Err(LedgerError::UserNotFound(user_id));
    }

    conn.execute(
        "INSERT INTO points_history (user_id, points, reason, transaction_type)
         VALUES (?1, ?2, ?3, 'earned')",
        params![user_id, amount, reason],
    )?;
    Ok(())
}

/// Conditionally decrement the balance and append the "spent" history row.
///
/// The WHERE clause carries the balance check, so two racing spends can
/// never both succeed on funds that only cover one of them. Does not open
/// a transaction; the caller already holds one.
pub(crate) fn debit(
    conn: &Connection,
    user_id: i64,
    amount: i64,
    reason: &str,
) -> LedgerResult<()> {
    let updated = conn.execute(
        "UPDATE users SET points = points - ?1 WHERE user_id = ?2 AND points >= ?1",
        params![amount, user_id],
    )?;
    if updated == 0 {
        // Zero rows means either no such user or not enough points.
        let available: Option<i64> = conn
            .query_row(
                "SELECT points FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        return match available {
            Some(points) => Err(LedgerError::InsufficientBalance {
                required: amount,
                available: points,
            }),
            None => Err(LedgerError::UserNotFound(user_id)),
        };
    }

    conn.execute(
        "INSERT INTO points_history (user_id, points, reason, transaction_type)
         VALUES (?1, ?2, ?3, 'spent')",
        params![user_id, -amount, reason],
    )?;
    Ok(())
}

/// Award points to a user
///
/// # Errors
///
/// Returns `InvalidAmount` for non-positive amounts and `UserNotFound` if
/// the user is not registered.
pub fn earn(conn: &mut DbConnection, user_id: i64, amount: i64, reason: &str) -> LedgerResult<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }

    let tx = conn.transaction()?;
    credit(&tx, user_id, amount, reason)?;
    tx.commit()?;
    Ok(())
}

/// Deduct points from a user
///
/// # Errors
///
/// Returns `InvalidAmount` for non-positive amounts, `UserNotFound` if the
/// user is not registered, and `InsufficientBalance` (with the current
/// balance) when the user cannot afford the deduction. On any error the
/// balance and history are left untouched.
pub fn spend(conn: &mut DbConnection, user_id: i64, amount: i64, reason: &str) -> LedgerResult<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }

    let tx = conn.transaction()?;
    debit(&tx, user_id, amount, reason)?;
    tx.commit()?;
    Ok(())
}

/// Current balance of a user
pub fn balance(conn: &DbConnection, user_id: i64) -> LedgerResult<i64> {
    let points: Option<i64> = conn
        .query_row(
            "SELECT points FROM users WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;
    points.ok_or(LedgerError::UserNotFound(user_id))
}

/// Fold the history into a balance. Used by tests and the drift check to
/// verify the materialized `users.points` column.
pub fn recompute_balance(conn: &DbConnection, user_id: i64) -> LedgerResult<i64> {
    let total = conn.query_row(
        "SELECT COALESCE(SUM(points), 0) FROM points_history WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(total)
}

/// Most recent history entries for a user (default 10)
pub fn history(
    conn: &DbConnection,
    user_id: i64,
    limit: Option<i64>,
) -> LedgerResult<Vec<PointsEntry>> {
    let limit = limit.unwrap_or(10);
    let mut stmt = conn.prepare(
        "SELECT points, reason, transaction_type, date FROM points_history
         WHERE user_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![user_id, limit], |row| {
        Ok(PointsEntry {
            points: row.get(0)?,
            reason: row.get(1)?,
            transaction_type: row.get(2)?,
            date: row.get(3)?,
        })
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}
