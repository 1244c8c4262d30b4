//! Error types for board operations.

use thiserror::Error;

/// Result type for board operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while mutating or (de)serializing a board.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A field the operation requires was empty.
    #[error("{0} is required")]
    Required(&'static str),

    /// The given string is not an absolute URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The payload was not valid JSON.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(#[from] serde_json::Error),

    /// The payload parsed as JSON but does not look like a board snapshot.
    #[error("unexpected snapshot shape: {0}")]
    SnapshotShape(String),
}
