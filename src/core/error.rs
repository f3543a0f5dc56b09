use thiserror::Error;

use crate::ledger::shop::PurchaseStatus;

/// Typed errors for ledger operations
///
/// Callers can distinguish business rejections (unknown user, insufficient
/// balance, invalid transition) from storage failures without matching on
/// message strings.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The user id has no row in `users`
    #[error("user {0} is not registered")]
    UserNotFound(i64),

    /// The lesson id has no row in `lessons`
    #[error("lesson {0} does not exist")]
    LessonNotFound(i64),

    /// The shop item id has no row in `shop_items`
    #[error("shop item {0} does not exist")]
    ItemNotFound(i64),

    /// The purchase id has no row in `purchases`
    #[error("purchase {0} does not exist")]
    PurchaseNotFound(String),

    /// A spend was rejected because the balance is too low
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },

    /// Earn/spend amounts must be strictly positive
    #[error("point amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// The item has no points price and can only be bought with card
    #[error("shop item {0} cannot be bought with points")]
    NotPurchasableWithPoints(i64),

    /// Purchase rows only move pending -> confirmed/failed/expired
    #[error("invalid purchase transition: {from} -> {to}")]
    InvalidTransition {
        from: PurchaseStatus,
        to: PurchaseStatus,
    },

    /// Database-related errors
    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("database pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

/// Type alias for Result with LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Centralized error type for the binary and background tasks
///
/// All errors in the application are converted to this enum for consistent
/// error handling. Uses `thiserror` for automatic conversion and display
/// formatting.
#[derive(Error, Debug)]
pub enum AppError {
    /// Ledger operation errors
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Database-related errors
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Errors reported by external collaborators (payments, delivery)
    #[error("gateway error: {0}")]
    Gateway(#[from] crate::gateway::GatewayError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anyhow errors (for general error handling)
    #[error("application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
