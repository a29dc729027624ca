use std::fmt;
use std::str::FromStr;

use apidoc_codec::{EncodeMode, TagEncoder};
use apidoc_types::Document;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{EtagError, EtagResult};
use crate::fnv::Fnv1a64;

/// Content tag of a document: FNV-1a 64 over its canonical tag stream.
///
/// Equal documents always produce the same tag regardless of key insertion
/// order. The text form is lowercase hex without leading zeros.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ETag(u64);

impl ETag {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Hash `doc` without materializing its encoding.
    pub fn compute(doc: &Document) -> EtagResult<Self> {
        let mut encoder = TagEncoder::new(Fnv1a64::new(), EncodeMode::Canonical);
        encoder.encode_document(doc)?;
        let tag = Self(encoder.into_inner().digest());
        trace!(entries = doc.len(), etag = %tag, "computed document etag");
        Ok(tag)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Parse 1 to 16 hex digits of either case.
    pub fn parse(s: &str) -> EtagResult<Self> {
        let valid = (1..=16).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(EtagError::InvalidTag(s.to_owned()));
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| EtagError::InvalidTag(s.to_owned()))
    }
}

impl fmt::Debug for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ETag({:x})", self.0)
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl FromStr for ETag {
    type Err = EtagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ETag {
    type Error = EtagError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ETag> for String {
    fn from(tag: ETag) -> Self {
        tag.to_string()
    }
}

impl From<u64> for ETag {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ETag> for u64 {
    fn from(tag: ETag) -> Self {
        tag.0
    }
}
