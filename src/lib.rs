//! CyberLedger - points, lesson-progress and purchase ledger for the
//! CyberBot AI learning bot.
//!
//! The crate owns a single SQLite database and every state change to it:
//! registrations, point awards and spends, lesson completions, referrals
//! and shop purchases. The chat transport, payment provider and other
//! external services are consumed through the traits in [`gateway`].
//!
//! # Module Structure
//!
//! - `core`: configuration, errors and logging
//! - `storage`: connection pool, schema, seeding and backups
//! - `ledger`: the state-changing operations and catalog reads
//! - `reporting`: read-only projections for the operator surface
//! - `gateway`: collaborator traits and the broadcast helper
//! - `sweeper`: background maintenance loop

pub mod cli;
pub mod core;
pub mod gateway;
pub mod ledger;
pub mod reporting;
pub mod storage;
pub mod sweeper;

// Re-export commonly used types for convenience
pub use self::core::{config, AppError, AppResult, LedgerError, LedgerResult};
pub use self::storage::{create_pool, get_connection, DbConnection, DbPool};
