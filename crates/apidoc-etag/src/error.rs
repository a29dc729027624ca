use apidoc_codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtagError {
    /// Text that is not 1 to 16 hexadecimal digits.
    #[error("invalid etag: {0:?}")]
    InvalidTag(String),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

pub type EtagResult<T> = Result<T, EtagError>;
