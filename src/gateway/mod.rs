//! Seams for external collaborators.
//!
//! The chat transport, the payment provider and similar services live
//! outside this crate; it only depends on these traits. Production wires
//! in real clients, tests wire in mocks.

pub mod broadcast;

use async_trait::async_trait;
use thiserror::Error;

use crate::ledger::shop::ShopItem;

/// Errors reported by external collaborators
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The collaborator rejected the request or was unreachable
    #[error("external service error: {0}")]
    Service(String),
}

/// Hosted checkout session handed back by the payment provider
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// The pending purchase this session settles
    pub purchase_id: String,
    /// URL the buyer completes the payment at
    pub url: String,
}

/// Payment provider seam. The ledger opens a pending purchase, asks the
/// gateway for a checkout session, and settles the purchase once the
/// provider reports the result.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session for a pending purchase
    async fn create_checkout(
        &self,
        user_id: i64,
        item: &ShopItem,
        purchase_id: &str,
    ) -> Result<CheckoutSession, GatewayError>;
}

/// Message delivery seam (the chat transport in production)
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one message to one user
    async fn send(&self, user_id: i64, message: &str) -> Result<(), GatewayError>;
}
