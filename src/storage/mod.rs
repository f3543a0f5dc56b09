//! Database pool, schema, seeding and backup functionality

pub mod backup;
pub mod db;
pub mod seed;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
