use std::time::Duration;

use reqwest::StatusCode;

use super::TokenStoreError;

/// Failures at the REST boundary.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("request cancelled")]
    Cancelled,
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

impl SyncError {
    /// True for failures where no HTTP status was received.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SyncError::Transport(_) | SyncError::Timeout(_) | SyncError::Cancelled
        )
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SyncError::Status { status, .. } => Some(*status),
            SyncError::Transport(error) => error.status(),
            _ => None,
        }
    }
}
