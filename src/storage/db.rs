use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Result};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and ensures the
/// schema exists on the first connection.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Returns
///
/// Returns a `DbPool` on success or an `r2d2::Error` if pool creation fails.
pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    // Writers from different pooled connections wait for the lock instead
    // of failing with SQLITE_BUSY.
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    });
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    // Ensure schema is up to date on first connection
    let conn = pool.get()?;
    if let Err(e) = migrate_schema(&conn) {
        log::warn!("Failed to migrate schema: {}", e);
        // Don't fail on migration errors, as they might be expected
    }

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Create all tables and indexes, then add columns that older deployments
/// are missing. Everything uses IF NOT EXISTS so this is safe to run on
/// every startup.
pub fn migrate_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            username TEXT,
            first_name TEXT,
            last_name TEXT,
            language TEXT DEFAULT 'ar',
            points INTEGER DEFAULT 0,
            level TEXT DEFAULT 'beginner',
            registration_date DATETIME DEFAULT CURRENT_TIMESTAMP,
            total_lessons_completed INTEGER DEFAULT 0,
            referral_code TEXT UNIQUE,
            referred_by INTEGER,
            is_vip INTEGER DEFAULT 0,
            vip_expires DATETIME,
            newsletter_subscribed INTEGER DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS lessons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title_ar TEXT NOT NULL,
            title_en TEXT NOT NULL,
            content_ar TEXT NOT NULL,
            content_en TEXT NOT NULL,
            level TEXT NOT NULL,
            points_reward INTEGER DEFAULT 10,
            is_premium INTEGER DEFAULT 0,
            created_date DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS quiz_questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lesson_id INTEGER NOT NULL,
            question_ar TEXT NOT NULL,
            question_en TEXT NOT NULL,
            option_a_ar TEXT, option_a_en TEXT,
            option_b_ar TEXT, option_b_en TEXT,
            option_c_ar TEXT, option_c_en TEXT,
            option_d_ar TEXT, option_d_en TEXT,
            correct_option TEXT NOT NULL,
            explanation_ar TEXT,
            explanation_en TEXT,
            FOREIGN KEY (lesson_id) REFERENCES lessons (id)
        );

        CREATE TABLE IF NOT EXISTS user_progress (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            lesson_id INTEGER NOT NULL,
            completed INTEGER DEFAULT 0,
            quiz_score INTEGER DEFAULT 0,
            completion_date DATETIME,
            UNIQUE (user_id, lesson_id),
            FOREIGN KEY (user_id) REFERENCES users (user_id),
            FOREIGN KEY (lesson_id) REFERENCES lessons (id)
        );

        CREATE TABLE IF NOT EXISTS points_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            points INTEGER NOT NULL,
            reason TEXT,
            transaction_type TEXT NOT NULL,
            date DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users (user_id)
        );

        CREATE TABLE IF NOT EXISTS referrals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            referrer_id INTEGER NOT NULL,
            referred_id INTEGER NOT NULL,
            points_awarded INTEGER DEFAULT 0,
            referral_date DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (referrer_id) REFERENCES users (user_id),
            FOREIGN KEY (referred_id) REFERENCES users (user_id)
        );

        CREATE TABLE IF NOT EXISTS shop_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name_ar TEXT NOT NULL,
            name_en TEXT NOT NULL,
            description_ar TEXT,
            description_en TEXT,
            price_points INTEGER DEFAULT 0,
            price_usd REAL DEFAULT 0,
            category TEXT NOT NULL,
            effect TEXT NOT NULL DEFAULT '{\"kind\":\"none\"}',
            is_available INTEGER DEFAULT 1,
            created_date DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS purchases (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            item_id INTEGER NOT NULL,
            payment_method TEXT NOT NULL,
            amount_points INTEGER DEFAULT 0,
            amount_usd REAL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending',
            purchase_date DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users (user_id),
            FOREIGN KEY (item_id) REFERENCES shop_items (id)
        );

        CREATE TABLE IF NOT EXISTS user_activities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            activity_type TEXT NOT NULL,
            details TEXT,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_points_history_user ON points_history (user_id);
        CREATE INDEX IF NOT EXISTS idx_user_progress_user ON user_progress (user_id);
        CREATE INDEX IF NOT EXISTS idx_purchases_user ON purchases (user_id);
        CREATE INDEX IF NOT EXISTS idx_user_activities_time ON user_activities (timestamp);",
    )?;

    // Early deployments created the users table without referral columns.
    let mut stmt = conn.prepare("PRAGMA table_info(users)")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }

    if !columns.contains(&"referred_by".to_string()) {
        log::info!("Adding missing column: referred_by to users table");
        if let Err(e) = conn.execute("ALTER TABLE users ADD COLUMN referred_by INTEGER", []) {
            log::warn!("Failed to add referred_by column: {}", e);
        }
    }

    if !columns.contains(&"newsletter_subscribed".to_string()) {
        log::info!("Adding missing column: newsletter_subscribed to users table");
        if let Err(e) = conn.execute(
            "ALTER TABLE users ADD COLUMN newsletter_subscribed INTEGER DEFAULT 1",
            [],
        ) {
            log::warn!("Failed to add newsletter_subscribed column: {}", e);
        }
    }

    Ok(())
}
