use thiserror::Error;

/// Top-level error type for the chatgate workspace.
///
/// The duplicate filter itself never fails; these variants cover the
/// surfaces around it (configuration, the thread store snapshot, the shared
/// filter lock). Subsystem crates convert into this type so that `?` works
/// across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatgateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<toml::de::Error> for ChatgateError {
    fn from(err: toml::de::Error) -> Self {
        ChatgateError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ChatgateError {
    fn from(err: toml::ser::Error) -> Self {
        ChatgateError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ChatgateError {
    fn from(err: serde_json::Error) -> Self {
        ChatgateError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for chatgate operations.
pub type Result<T> = std::result::Result<T, ChatgateError>;
