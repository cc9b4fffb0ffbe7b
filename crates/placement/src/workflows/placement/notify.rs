use tracing::info;

/// Outbound audit hook. Delivery is fire-and-forget: managers log a failed
/// delivery and carry on.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Writes audit messages to the `placement::audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        info!(target: "placement::audit", "{message}");
        Ok(())
    }
}
