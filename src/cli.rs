use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cyberledger")]
#[command(author, version, about = "Points, lesson-progress and purchase ledger for the CyberBot AI learning bot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the background maintenance sweeper (VIP expiry + scheduled backups)
    Run,

    /// Create the schema and insert the default lesson and shop catalog
    Seed,

    /// Print dashboard statistics
    Stats {
        /// Emit JSON instead of the human-readable summary
        #[arg(long)]
        json: bool,
    },

    /// Print the points leaderboard
    Leaderboard {
        /// Maximum number of rows to print
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },

    /// Demote users whose VIP period has ended
    ExpireVip,

    /// Verify that every balance matches its points history
    CheckLedger,

    /// Create a timestamped database backup
    Backup,

    /// List available backups
    ListBackups,

    /// Restore the database from a backup file
    Restore {
        /// Path to the backup file
        path: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
