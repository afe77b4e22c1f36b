//! Error types for message routing.

use chatgate_core::error::ChatgateError;

/// Errors from the routing layer.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("filter error: {0}")]
    Filter(String),
    #[error("classifier error: {0}")]
    Classifier(String),
    #[error("thread store error: {0}")]
    ThreadStore(String),
}

impl From<ChatgateError> for RouterError {
    fn from(err: ChatgateError) -> Self {
        RouterError::Filter(err.to_string())
    }
}
