use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to publish notification: {0}")]
    Publish(String),
}

/// At-least-once, best-effort asynchronous message channel.
///
/// The orchestrator publishes opaque text payloads and never waits for
/// delivery; redelivery is the channel's responsibility, not the caller's.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn publish(&self, payload: &str) -> Result<(), NotifyError>;
}
