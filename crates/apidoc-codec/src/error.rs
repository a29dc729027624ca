use apidoc_types::{DocumentError, ValueKind};
use thiserror::Error;

use crate::tag::TagType;

/// Errors from encoding or decoding documents.
///
/// Offsets count bytes of the tag stream (after decompression, for binary
/// envelopes) consumed before the failure was detected.
#[derive(Debug, Error)]
pub enum CodecError {
    /// I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended in the middle of a required read.
    #[error("truncated input at offset {offset}: expected {reading}")]
    Truncated { offset: u64, reading: &'static str },

    /// A tag byte outside the known set, including the reserved zero tag.
    #[error("unknown tag byte {tag:#04x} at offset {offset}")]
    UnknownTag { tag: u8, offset: u64 },

    /// A known tag where the grammar does not allow it.
    #[error("unexpected {tag} tag at offset {offset} while reading {context}")]
    UnexpectedTag {
        tag: TagType,
        offset: u64,
        context: &'static str,
    },

    /// A string length prefix that is negative or does not fit in memory.
    #[error("invalid string length {length} at offset {offset}")]
    InvalidLength { length: i64, offset: u64 },

    /// String bytes that are not UTF-8.
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: u64 },

    /// A bool payload byte other than 0 or 1.
    #[error("invalid bool byte {byte:#04x} at offset {offset}")]
    InvalidBool { byte: u8, offset: u64 },

    /// Containers nested deeper than the configured limit.
    #[error("nesting depth exceeds {max_depth} at offset {offset}")]
    DepthExceeded { max_depth: usize, offset: u64 },

    /// Bytes left over after a complete value.
    #[error("{count} trailing bytes after value at offset {offset}")]
    TrailingBytes { count: usize, offset: u64 },

    /// A binary envelope whose top-level value is not a document.
    #[error("expected document, found {found}")]
    NotADocument { found: ValueKind },

    /// Legacy envelope whose CRC-32 does not match its payload.
    #[error("checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { expected: u32, computed: u32 },

    /// The block compressor failed.
    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// The JSON projection could not be parsed or produced.
    #[error("JSON projection error: {0}")]
    Json(String),

    /// A value the target format cannot represent.
    #[error("unsupported value at {path}: {reason}")]
    UnsupportedValue { path: String, reason: String },
}

impl From<DocumentError> for CodecError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::UnsupportedValue { path, reason } => {
                Self::UnsupportedValue { path, reason }
            }
            DocumentError::Json(e) => Self::Json(e.to_string()),
        }
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
