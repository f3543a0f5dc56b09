use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the ledger service

/// Path to the SQLite database file
/// Read once at startup from CYBERBOT_DATABASE_PATH or defaults to "cyberbot.db"
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("CYBERBOT_DATABASE_PATH").unwrap_or_else(|_| "cyberbot.db".to_string()));

/// Path to the log file
/// Read once at startup from CYBERBOT_LOG_FILE or defaults to "cyberledger.log"
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("CYBERBOT_LOG_FILE").unwrap_or_else(|_| "cyberledger.log".to_string()));

/// Point award configuration
pub mod rewards {
    /// Welcome bonus granted once at registration
    pub const WELCOME_POINTS: i64 = 10;

    /// Extra welcome points when the new user arrived through a referral link
    pub const REFERRED_EXTRA_POINTS: i64 = 20;

    /// Points granted to the referrer for each referred registration
    pub const REFERRER_POINTS: i64 = 50;

    /// Points per correct quiz answer, added on top of the lesson reward
    pub const POINTS_PER_CORRECT_ANSWER: i64 = 2;
}

/// Referral code generation
pub mod referral {
    /// Length of the generated referral code (uppercase hex from a UUID)
    pub const CODE_LENGTH: usize = 8;
}

/// Background sweeper configuration
pub mod sweeper {
    use super::Duration;

    /// Interval between VIP expiry sweeps (in seconds)
    pub const VIP_SWEEP_INTERVAL_SECS: u64 = 3600;

    /// Interval between scheduled database backups (in seconds)
    pub const BACKUP_INTERVAL_SECS: u64 = 86_400;

    /// VIP sweep interval duration
    pub fn vip_sweep_interval() -> Duration {
        Duration::from_secs(VIP_SWEEP_INTERVAL_SECS)
    }

    /// Backup interval duration
    pub fn backup_interval() -> Duration {
        Duration::from_secs(BACKUP_INTERVAL_SECS)
    }
}

/// Broadcast throttling configuration
pub mod broadcast {
    use super::Duration;

    /// Delay between consecutive sends during a broadcast (in milliseconds)
    pub const SEND_DELAY_MS: u64 = 50;

    /// Inter-send delay duration
    pub fn send_delay() -> Duration {
        Duration::from_millis(SEND_DELAY_MS)
    }
}
