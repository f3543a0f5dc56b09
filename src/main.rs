use anyhow::Result;
use dotenvy::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

use cyberledger::cli::{Cli, Commands};
use cyberledger::core::{config, init_logger};
use cyberledger::ledger::users;
use cyberledger::reporting;
use cyberledger::storage::{backup, create_pool, get_connection, seed, DbPool};
use cyberledger::sweeper;

/// Main entry point for the ledger service
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables before any config static is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) | None => run_sweeper().await,
        Some(Commands::Seed) => run_seed(),
        Some(Commands::Stats { json }) => run_stats(json),
        Some(Commands::Leaderboard { limit }) => run_leaderboard(limit),
        Some(Commands::ExpireVip) => run_expire_vip(),
        Some(Commands::CheckLedger) => run_check_ledger(),
        Some(Commands::Backup) => {
            backup::create_backup(&config::DATABASE_PATH)?;
            Ok(())
        }
        Some(Commands::ListBackups) => run_list_backups(),
        Some(Commands::Restore { path }) => run_restore(&path),
    }
}

fn open_pool() -> Result<Arc<DbPool>> {
    let pool = create_pool(&config::DATABASE_PATH)
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
    Ok(Arc::new(pool))
}

/// Run the maintenance sweeper until Ctrl+C
async fn run_sweeper() -> Result<()> {
    let db_pool = open_pool()?;

    {
        let conn = get_connection(&db_pool)?;
        seed::seed_if_empty(&conn)?;
    }

    let handle = sweeper::start_sweeper(Arc::clone(&db_pool));
    log::info!("cyberledger running, press Ctrl+C to stop");

    signal::ctrl_c().await?;
    log::info!("Shutdown signal received");
    handle.abort();

    Ok(())
}

/// Create the schema and seed the default catalog
fn run_seed() -> Result<()> {
    let db_pool = open_pool()?;
    let conn = get_connection(&db_pool)?;
    seed::seed_if_empty(&conn)?;
    println!("Database ready: {}", *config::DATABASE_PATH);
    Ok(())
}

/// Print the dashboard snapshot
fn run_stats(json: bool) -> Result<()> {
    let db_pool = open_pool()?;
    let conn = get_connection(&db_pool)?;
    let stats = reporting::dashboard(&conn)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Users:      {} total, {} new today, {} VIP", stats.users.total, stats.users.new_today, stats.users.vip);
    println!("Lessons:    {} total, {} completions", stats.lessons.total, stats.lessons.completions);
    println!(
        "Points:     {} in circulation ({} earned, {} spent, {} transactions)",
        stats.points.total_balance,
        stats.points.earned_total,
        stats.points.spent_total,
        stats.points.transactions
    );
    println!(
        "Purchases:  {} total, {} confirmed, ${:.2} revenue",
        stats.purchases.total, stats.purchases.confirmed, stats.purchases.revenue_usd
    );
    Ok(())
}

/// Print the top of the leaderboard
fn run_leaderboard(limit: i64) -> Result<()> {
    let db_pool = open_pool()?;
    let conn = get_connection(&db_pool)?;
    let entries = users::leaderboard(&conn, limit)?;

    for (rank, entry) in entries.iter().enumerate() {
        let name = entry.first_name.as_deref().unwrap_or("-");
        println!(
            "{:>3}. {} ({}): {} points, {} lessons",
            rank + 1,
            name,
            entry.user_id,
            entry.points,
            entry.total_lessons_completed
        );
    }
    Ok(())
}

/// Demote expired VIPs once, outside the sweeper
fn run_expire_vip() -> Result<()> {
    let db_pool = open_pool()?;
    let conn = get_connection(&db_pool)?;
    let count = users::expire_vip(&conn)?;
    println!("Demoted {} user(s)", count);
    Ok(())
}

/// Compare every balance against its ledger fold
fn run_check_ledger() -> Result<()> {
    let db_pool = open_pool()?;
    let conn = get_connection(&db_pool)?;
    let drift = reporting::ledger_drift(&conn)?;

    if drift.is_empty() {
        println!("OK: all balances match their points history");
        return Ok(());
    }

    for entry in &drift {
        println!(
            "user {}: balance {} != ledger {}",
            entry.user_id, entry.balance, entry.ledger_total
        );
    }
    Err(anyhow::anyhow!("{} balance(s) drifted", drift.len()))
}

/// List backups, newest first
fn run_list_backups() -> Result<()> {
    let backups = backup::list_backups()?;
    if backups.is_empty() {
        println!("No backups found");
        return Ok(());
    }
    for (path, created) in &backups {
        println!("{}  {}", created.format("%Y-%m-%d %H:%M:%S"), path.display());
    }
    Ok(())
}

/// Restore the database from a backup file
fn run_restore(path: &Path) -> Result<()> {
    backup::restore_backup(path, &config::DATABASE_PATH)?;
    println!("Restored {} from {}", *config::DATABASE_PATH, path.display());
    Ok(())
}
