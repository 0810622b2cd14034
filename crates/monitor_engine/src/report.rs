use monitor_core::{EndpointSet, Target};

use crate::persist::PersistError;

/// Endpoints seen for the first time in one run of a target.
#[derive(Debug, Clone, Copy)]
pub struct NewEndpoints<'a> {
    pub target: &'a Target,
    pub endpoints: &'a EndpointSet,
    /// RFC 3339 timestamp of the run.
    pub observed_utc: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("webhook request failed: {0}")]
    Webhook(String),
    #[error("webhook returned status {0}")]
    WebhookStatus(u16),
    #[error("failed to read report {path}: {message}")]
    Read { path: String, message: String },
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Delivers a run's new endpoints somewhere a human will see them.
///
/// Reporters are only invoked when the diff is non-empty.
#[async_trait::async_trait]
pub trait Reporter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn report(&self, new: NewEndpoints<'_>) -> Result<(), ReportError>;
}
