use thiserror::Error;

/// Error type that captures storage and session failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Transaction not found: {0}")]
    NotFound(String),
    #[error("No user is signed in")]
    Unauthenticated,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Storage error: {0}")]
    Storage(String),
}
