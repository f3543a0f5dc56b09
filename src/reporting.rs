//! Read-only projections for the operator surface: dashboard counters,
//! activity tracking and the balance/ledger drift check.

use rusqlite::params;
use serde::Serialize;

use crate::core::error::LedgerResult;
use crate::storage::db::DbConnection;

/// User-related dashboard counters
#[derive(Debug, Clone, Serialize)]
pub struct UserCounters {
    pub total: i64,
    pub new_today: i64,
    pub vip: i64,
}

/// Lesson-related dashboard counters
#[derive(Debug, Clone, Serialize)]
pub struct LessonCounters {
    pub total: i64,
    pub completions: i64,
}

/// Points-related dashboard counters
#[derive(Debug, Clone, Serialize)]
pub struct PointsCounters {
    /// Sum of all current balances
    pub total_balance: i64,
    pub earned_total: i64,
    pub spent_total: i64,
    pub transactions: i64,
}

/// Purchase-related dashboard counters
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseCounters {
    pub total: i64,
    pub confirmed: i64,
    /// USD revenue over confirmed card purchases
    pub revenue_usd: f64,
}

/// Snapshot of the whole system for the admin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub users: UserCounters,
    pub lessons: LessonCounters,
    pub points: PointsCounters,
    pub purchases: PurchaseCounters,
}

/// Collect the dashboard snapshot
pub fn dashboard(conn: &DbConnection) -> LedgerResult<DashboardStats> {
    let users = UserCounters {
        total: conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?,
        new_today: conn.query_row(
            "SELECT COUNT(*) FROM users WHERE DATE(registration_date) = DATE('now')",
            [],
            |row| row.get(0),
        )?,
        vip: conn.query_row("SELECT COUNT(*) FROM users WHERE is_vip = 1", [], |row| {
            row.get(0)
        })?,
    };

    let lessons = LessonCounters {
        total: conn.query_row("SELECT COUNT(*) FROM lessons", [], |row| row.get(0))?,
        completions: conn.query_row(
            "SELECT COUNT(*) FROM user_progress WHERE completed = 1",
            [],
            |row| row.get(0),
        )?,
    };

    let points = PointsCounters {
        total_balance: conn.query_row("SELECT COALESCE(SUM(points), 0) FROM users", [], |row| {
            row.get(0)
        })?,
        earned_total: conn.query_row(
            "SELECT COALESCE(SUM(points), 0) FROM points_history WHERE transaction_type = 'earned'",
            [],
            |row| row.get(0),
        )?,
        spent_total: conn.query_row(
            "SELECT COALESCE(SUM(-points), 0) FROM points_history WHERE transaction_type = 'spent'",
            [],
            |row| row.get(0),
        )?,
        transactions: conn.query_row("SELECT COUNT(*) FROM points_history", [], |row| row.get(0))?,
    };

    let purchases = PurchaseCounters {
        total: conn.query_row("SELECT COUNT(*) FROM purchases", [], |row| row.get(0))?,
        confirmed: conn.query_row(
            "SELECT COUNT(*) FROM purchases WHERE status = 'confirmed'",
            [],
            |row| row.get(0),
        )?,
        revenue_usd: conn.query_row(
            "SELECT COALESCE(SUM(amount_usd), 0) FROM purchases WHERE status = 'confirmed'",
            [],
            |row| row.get(0),
        )?,
    };

    Ok(DashboardStats {
        users,
        lessons,
        points,
        purchases,
    })
}

/// Append one activity row (menu opens, quiz starts, broadcasts, ...)
pub fn record_activity(
    conn: &DbConnection,
    user_id: i64,
    activity_type: &str,
    details: Option<&str>,
) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO user_activities (user_id, activity_type, details) VALUES (?1, ?2, ?3)",
        params![user_id, activity_type, details],
    )?;
    Ok(())
}

/// Activity counts per day over the last `days` days, newest first
pub fn activity_by_day(conn: &DbConnection, days: i64) -> LedgerResult<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT DATE(timestamp) AS day, COUNT(*) AS cnt
         FROM user_activities
         WHERE timestamp >= datetime('now', '-' || ?1 || ' days')
         GROUP BY DATE(timestamp)
         ORDER BY day DESC",
    )?;
    let rows = stmt.query_map(params![days], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut activity = Vec::new();
    for row in rows {
        activity.push(row?);
    }
    Ok(activity)
}

/// One user whose stored balance disagrees with their history
#[derive(Debug, Clone, Serialize)]
pub struct DriftEntry {
    pub user_id: i64,
    pub balance: i64,
    pub ledger_total: i64,
}

/// Users whose materialized balance differs from the ledger fold.
///
/// Empty on a healthy database; any row here means a write bypassed the
/// ledger functions.
pub fn ledger_drift(conn: &DbConnection) -> LedgerResult<Vec<DriftEntry>> {
    let mut stmt = conn.prepare(
        "SELECT u.user_id, u.points, COALESCE(SUM(h.points), 0) AS ledger_total
         FROM users u
         LEFT JOIN points_history h ON h.user_id = u.user_id
         GROUP BY u.user_id
         HAVING u.points != ledger_total",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DriftEntry {
            user_id: row.get(0)?,
            balance: row.get(1)?,
            ledger_total: row.get(2)?,
        })
    })?;

    let mut drift = Vec::new();
    for row in rows {
        drift.push(row?);
    }
    Ok(drift)
}
