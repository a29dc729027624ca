//! Persisted-blob envelope.
//!
//! ```text
//! binary:  [u32 LE = 1] [snappy frames | zstd frame (tag stream)]
//! legacy:  [u32 LE crc32(json)] [json]
//! ```
//!
//! The first four bytes are read as a little-endian marker. A value of
//! [`BINARY_FORMAT_CODE`] selects the binary form; anything else is taken
//! as the CRC-32 of a legacy JSON payload. Inside a binary envelope the
//! compressor is recognized by its stream magic.

use std::io::{Read, Write};

use apidoc_types::{json, Document};
use tracing::{debug, warn};

use crate::config::{CodecConfig, Compression};
use crate::decode::TagDecoder;
use crate::encode::{EncodeMode, TagEncoder};
use crate::error::{CodecError, CodecResult};

/// Marker written at the start of every binary envelope.
pub const BINARY_FORMAT_CODE: u32 = 1;

const MARKER_LEN: usize = 4;

/// Stream identifier chunk that opens every snappy framed stream.
const SNAPPY_MAGIC: [u8; 10] = [0xff, 0x06, 0x00, 0x00, b's', b'N', b'a', b'P', b'p', b'Y'];

/// zstd frame magic number, little-endian.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Reads and writes documents in the persisted-blob envelope.
#[derive(Clone, Debug, Default)]
pub struct DocumentCodec {
    config: CodecConfig,
}

impl DocumentCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode `doc` as a compressed binary envelope.
    ///
    /// Documents nested deeper than `max_depth` are rejected here, so every
    /// blob this codec writes can be read back under the same config.
    pub fn marshal(&self, doc: &Document) -> CodecResult<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(&BINARY_FORMAT_CODE.to_le_bytes());

        let out = match self.config.compression {
            Compression::Snappy => {
                let mut encoder = self.tag_encoder(snap::write::FrameEncoder::new(out));
                encoder.encode_document(doc)?;
                encoder
                    .into_inner()
                    .into_inner()
                    .map_err(|e| CodecError::CompressionFailed(e.to_string()))?
            }
            Compression::Zstd => {
                let compressor =
                    zstd::stream::write::Encoder::new(out, self.config.compression_level)
                        .map_err(|e| CodecError::CompressionFailed(e.to_string()))?;
                let mut encoder = self.tag_encoder(compressor);
                encoder.encode_document(doc)?;
                encoder
                    .into_inner()
                    .finish()
                    .map_err(|e| CodecError::CompressionFailed(e.to_string()))?
            }
        };

        debug!(
            format = "binary",
            compression = ?self.config.compression,
            entries = doc.len(),
            len = out.len(),
            "document marshalled"
        );
        Ok(out)
    }

    /// Encode `doc` in the legacy checksummed JSON form.
    pub fn marshal_legacy(&self, doc: &Document) -> CodecResult<Vec<u8>> {
        let payload = json::to_json_vec(doc)?;
        let crc = crc32fast::hash(&payload);
        let mut out = Vec::with_capacity(MARKER_LEN + payload.len());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&payload);
        debug!(format = "legacy", len = out.len(), "document marshalled");
        Ok(out)
    }

    /// Decode a blob written by [`marshal`](Self::marshal) or
    /// [`marshal_legacy`](Self::marshal_legacy), under either compressor.
    pub fn unmarshal(&self, data: &[u8]) -> CodecResult<Document> {
        let Some((marker, payload)) = split_marker(data) else {
            return Err(CodecError::Truncated {
                offset: data.len() as u64,
                reading: "format marker",
            });
        };

        if marker == BINARY_FORMAT_CODE {
            let compression = detect_compression(payload).ok_or_else(|| {
                CodecError::CompressionFailed("unrecognized compressed stream".into())
            })?;
            let doc = match compression {
                Compression::Snappy => self.decode_stream(snap::read::FrameDecoder::new(payload))?,
                Compression::Zstd => {
                    let decompressor = zstd::stream::read::Decoder::with_buffer(payload)
                        .map_err(|e| CodecError::CompressionFailed(e.to_string()))?;
                    self.decode_stream(decompressor)?
                }
            };
            debug!(
                format = "binary",
                compression = ?compression,
                len = data.len(),
                entries = doc.len(),
                "document unmarshalled"
            );
            return Ok(doc);
        }

        let computed = crc32fast::hash(payload);
        if computed != marker {
            warn!(
                expected = marker,
                computed,
                len = data.len(),
                "legacy document checksum mismatch"
            );
            return Err(CodecError::ChecksumMismatch {
                expected: marker,
                computed,
            });
        }
        warn!(len = data.len(), "reading legacy JSON document");
        Ok(json::from_json_slice(payload)?)
    }

    fn tag_encoder<W: Write>(&self, writer: W) -> TagEncoder<W> {
        TagEncoder::new(writer, EncodeMode::Natural).with_max_depth(self.config.max_depth)
    }

    /// Decode straight from the decompressor; nothing is inflated ahead of
    /// the tag decoder.
    fn decode_stream<R: Read>(&self, reader: R) -> CodecResult<Document> {
        let mut decoder = TagDecoder::new(reader, self.config.max_depth);
        let doc = decoder.decode_document()?;
        decoder.finish()?;
        Ok(doc)
    }
}

fn split_marker(data: &[u8]) -> Option<(u32, &[u8])> {
    let (head, payload) = data.split_first_chunk::<MARKER_LEN>()?;
    Some((u32::from_le_bytes(*head), payload))
}

fn detect_compression(payload: &[u8]) -> Option<Compression> {
    if payload.starts_with(&SNAPPY_MAGIC) {
        Some(Compression::Snappy)
    } else if payload.starts_with(&ZSTD_MAGIC) {
        Some(Compression::Zstd)
    } else {
        None
    }
}
