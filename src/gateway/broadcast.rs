//! Throttled fan-out of one message to many users.
//!
//! Sends sequentially with a fixed delay between sends so the chat
//! transport's rate limits are respected. A failed delivery is counted
//! and logged but never stops the rest of the broadcast.

use tokio::time::sleep;

use crate::core::config;
use crate::gateway::NotificationSink;

/// Outcome of a broadcast run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

/// Send `message` to every recipient through the sink
pub async fn broadcast(
    sink: &dyn NotificationSink,
    recipients: &[i64],
    message: &str,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    for user_id in recipients {
        match sink.send(*user_id, message).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                log::warn!("Broadcast delivery to {} failed: {}", user_id, e);
                report.failed += 1;
            }
        }
        sleep(config::broadcast::send_delay()).await;
    }

    log::info!(
        "Broadcast finished: {} sent, {} failed",
        report.sent,
        report.failed
    );
    report
}
