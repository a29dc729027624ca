use serde::{Deserialize, Serialize};

/// Block compressor applied to the tag stream inside a binary envelope.
///
/// Readers detect the compressor from the payload itself, so either choice
/// can be read back by any codec configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Snappy framing format. Readable by every existing consumer of the
    /// cache.
    #[default]
    Snappy,
    /// zstd frame at [`CodecConfig::compression_level`].
    Zstd,
}

/// Configuration for document encoding and decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Deepest container nesting accepted on encode and decode (the root
    /// document is depth 1). Deeper input is rejected instead of exhausting
    /// the stack.
    pub max_depth: usize,
    /// Compressor used when writing binary envelopes.
    pub compression: Compression,
    /// zstd level, used only with [`Compression::Zstd`].
    pub compression_level: i32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: 128,
            compression: Compression::Snappy,
            compression_level: 3,
        }
    }
}

impl CodecConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }
}
