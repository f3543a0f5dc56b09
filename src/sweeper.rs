//! Background maintenance loop.
//!
//! Runs as a `tokio::spawn`ed task: demotes users whose VIP period ended
//! on every tick and takes a timestamped database backup once per backup
//! interval.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};

use crate::core::config;
use crate::core::error::AppResult;
use crate::ledger::users;
use crate::storage::db::DbPool;
use crate::storage::{backup, get_connection};

/// Start the maintenance sweeper background task
pub fn start_sweeper(db_pool: Arc<DbPool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(config::sweeper::vip_sweep_interval());
        let mut last_backup = Instant::now();

        log::info!(
            "Sweeper started (vip sweep: {}s, backup: {}s)",
            config::sweeper::VIP_SWEEP_INTERVAL_SECS,
            config::sweeper::BACKUP_INTERVAL_SECS,
        );

        loop {
            ticker.tick().await;

            if let Err(e) = run_vip_sweep(&db_pool) {
                log::error!("VIP sweep failed: {}", e);
            }

            if last_backup.elapsed() >= config::sweeper::backup_interval() {
                match backup::create_backup(&config::DATABASE_PATH) {
                    Ok(path) => {
                        last_backup = Instant::now();
                        log::info!("Scheduled backup written: {}", path.display());
                    }
                    Err(e) => log::error!("Scheduled backup failed: {}", e),
                }
            }
        }
    })
}

/// Run one VIP expiry pass
fn run_vip_sweep(db_pool: &Arc<DbPool>) -> AppResult<()> {
    let conn = get_connection(db_pool)?;
    users::expire_vip(&conn)?;
    Ok(())
}
