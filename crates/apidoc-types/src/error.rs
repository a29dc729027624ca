use thiserror::Error;

/// Errors produced by document operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The textual form could not be parsed, or its root was not an object.
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// A value cannot be represented in the requested projection.
    #[error("unsupported value at {path}: {reason}")]
    UnsupportedValue { path: String, reason: String },
}

/// Result alias for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;
