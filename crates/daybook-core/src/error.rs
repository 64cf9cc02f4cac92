//! Error types for daybook.

use thiserror::Error;

/// Result type alias using daybook's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for daybook operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entry not found
    #[error("Entry not found: {0}")]
    EntryNotFound(uuid::Uuid),

    /// Attachment not found
    #[error("Attachment not found: {0}")]
    AttachmentNotFound(uuid::Uuid),

    /// Embedding backend rejected the request
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Generation backend rejected the request
    #[error("Inference error: {0}")]
    Inference(String),

    /// A backend call exceeded its deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// A backend responded with a body this crate cannot decode
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// HTTP/network transport failed
    #[error("Request error: {0}")]
    Request(String),

    /// Nearest-neighbor search failed
    #[error("Search error: {0}")]
    Search(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // Timeouts and undecodable bodies are distinguished so callers can
        // pick a degradation strategy per call site.
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else if e.is_decode() {
            Error::Malformed(e.to_string())
        } else {
            Error::Request(e.to_string())
        }
    }
}
