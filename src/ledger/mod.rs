//! Ledger & progress store: every state change to user balances, lesson
//! progress and purchases goes through the free functions in this module,
//! each over a pooled database connection.

pub mod achievements;
pub mod lessons;
pub mod points;
pub mod progress;
pub mod referrals;
pub mod shop;
pub mod users;

// Re-exports for convenience
pub use progress::CompletionOutcome;
pub use shop::{ItemEffect, PaymentMethod, PurchaseStatus};
pub use users::RegisterOutcome;
