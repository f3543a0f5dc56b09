use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum number of backups kept on disk
const MAX_BACKUPS: usize = 30;

/// Directory where backups are stored
const BACKUP_DIR: &str = "backups";

/// Create the backup directory if it does not exist yet
fn ensure_backup_dir() -> Result<PathBuf> {
    let backup_dir = PathBuf::from(BACKUP_DIR);
    if !backup_dir.exists() {
        fs::create_dir_all(&backup_dir)?;
        log::info!("Created backup directory: {}", backup_dir.display());
    }
    Ok(backup_dir)
}

/// Create a timestamped copy of the database file
///
/// # Arguments
///
/// * `db_path` - Path to the database file
///
/// # Returns
///
/// Returns the path of the created backup, or an error.
pub fn create_backup(db_path: &str) -> Result<PathBuf> {
    let backup_dir = ensure_backup_dir()?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let db_name = Path::new(db_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("cyberbot.db");
    let backup_filename = format!("{}_{}", timestamp, db_name);
    let backup_path = backup_dir.join(backup_filename);

    fs::copy(db_path, &backup_path)?;
    log::info!("Created backup: {}", backup_path.display());

    cleanup_old_backups(&backup_dir)?;

    Ok(backup_path)
}

/// Parse the timestamp prefix out of a backup file name
/// (format: YYYYMMDD_HHMMSS_cyberbot.db)
fn parse_backup_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    let file_name = path.file_name().and_then(|n| n.to_str())?;
    let timestamp_part = file_name
        .split('_')
        .take(2)
        .collect::<Vec<_>>()
        .join("_");
    let timestamp_part = timestamp_part.get(0..15)?;
    NaiveDateTime::parse_from_str(timestamp_part, "%Y%m%d_%H%M%S")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Collect all backup files in the directory, newest first
fn collect_backups(backup_dir: &Path) -> Result<Vec<(PathBuf, DateTime<Utc>)>> {
    let mut backups: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();

    if backup_dir.is_dir() {
        for entry in fs::read_dir(backup_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("db") {
                if let Some(dt) = parse_backup_timestamp(&path) {
                    backups.push((path, dt));
                }
            }
        }
    }

    backups.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(backups)
}

/// Delete old backups, keeping only the most recent MAX_BACKUPS
fn cleanup_old_backups(backup_dir: &Path) -> Result<()> {
    let backups = collect_backups(backup_dir)?;

    if backups.len() > MAX_BACKUPS {
        for (path, _) in backups.iter().skip(MAX_BACKUPS) {
            if let Err(e) = fs::remove_file(path) {
                log::warn!("Failed to remove old backup {}: {}", path.display(), e);
            } else {
                log::info!("Removed old backup: {}", path.display());
            }
        }
    }

    Ok(())
}

/// List all backups, newest first
pub fn list_backups() -> Result<Vec<(PathBuf, DateTime<Utc>)>> {
    let backup_dir = ensure_backup_dir()?;
    collect_backups(&backup_dir)
}

/// Restore the database from a backup file
///
/// # Arguments
///
/// * `backup_path` - Path to the backup file
/// * `db_path` - Path the database should be restored to
pub fn restore_backup(backup_path: &Path, db_path: &str) -> Result<()> {
    if !backup_path.exists() {
        return Err(anyhow::anyhow!(
            "Backup file does not exist: {}",
            backup_path.display()
        ));
    }

    fs::copy(backup_path, db_path)?;
    log::info!("Restored database from backup: {}", backup_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backup_timestamp() {
        let path = Path::new("backups/20260115_093000_cyberbot.db");
        let dt = parse_backup_timestamp(path).unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2026-01-15 09:30:00");
    }

    #[test]
    fn test_parse_backup_timestamp_rejects_garbage() {
        assert!(parse_backup_timestamp(Path::new("backups/notabackup.db")).is_none());
    }
}
