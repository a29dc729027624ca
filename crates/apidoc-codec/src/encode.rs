use std::io::Write;

use apidoc_types::{Document, Value};

use crate::error::{CodecError, CodecResult};
use crate::tag::TagType;

/// Key ordering and number handling for the tag stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EncodeMode {
    /// Keys in the document's natural iteration order; numbers as stored.
    /// Equal documents may encode to different bytes. Used for persistence.
    #[default]
    Natural,
    /// Keys sorted, `-0.0` written as `0.0` and every NaN as the canonical
    /// NaN. Equal documents always encode to identical bytes. Used for
    /// content hashing.
    Canonical,
}

/// Streams a document tree into a writer as tag-prefixed bytes.
///
/// On error the bytes already written are not rolled back; the caller must
/// discard the output.
pub struct TagEncoder<W> {
    writer: W,
    mode: EncodeMode,
    written: u64,
    depth: usize,
    max_depth: usize,
}

impl<W: Write> TagEncoder<W> {
    pub fn new(writer: W, mode: EncodeMode) -> Self {
        Self {
            writer,
            mode,
            written: 0,
            depth: 0,
            max_depth: usize::MAX,
        }
    }

    /// Refuse containers nested deeper than `max_depth`, counted the same
    /// way as [`TagDecoder`](crate::TagDecoder) counts them.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Write `DocumentStart`, each key/value pair, then `DocumentEnd`.
    pub fn encode_document(&mut self, doc: &Document) -> CodecResult<()> {
        self.enter()?;
        self.write_tag(TagType::DocumentStart)?;
        match self.mode {
            EncodeMode::Natural => {
                for (key, value) in doc {
                    self.write_string(key)?;
                    self.encode_value(value)?;
                }
            }
            EncodeMode::Canonical => {
                for (key, value) in doc.iter_sorted() {
                    self.write_string(key)?;
                    self.encode_value(value)?;
                }
            }
        }
        self.write_tag(TagType::DocumentEnd)?;
        self.depth -= 1;
        Ok(())
    }

    pub fn encode_value(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null => self.write_tag(TagType::Nil),
            Value::Bool(b) => self.write_raw(&[TagType::Bool.type_byte(), u8::from(*b)]),
            Value::Number(n) => self.write_f64(*n),
            Value::String(s) => self.write_string(s),
            Value::List(items) => {
                self.enter()?;
                self.write_tag(TagType::ListStart)?;
                for item in items {
                    self.encode_value(item)?;
                }
                self.write_tag(TagType::ListEnd)?;
                self.depth -= 1;
                Ok(())
            }
            Value::Document(doc) => self.encode_document(doc),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn enter(&mut self) -> CodecResult<()> {
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthExceeded {
                max_depth: self.max_depth,
                offset: self.written,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn write_tag(&mut self, tag: TagType) -> CodecResult<()> {
        self.write_raw(&[tag.type_byte()])
    }

    fn write_string(&mut self, s: &str) -> CodecResult<()> {
        self.write_tag(TagType::String)?;
        // usize -> i64 cannot overflow for any allocatable string.
        self.write_raw(&(s.len() as i64).to_le_bytes())?;
        self.write_raw(s.as_bytes())
    }

    fn write_f64(&mut self, n: f64) -> CodecResult<()> {
        let n = match self.mode {
            EncodeMode::Natural => n,
            EncodeMode::Canonical => canonical_f64(n),
        };
        self.write_tag(TagType::Float64)?;
        self.write_raw(&n.to_le_bytes())
    }
}

/// Collapse the number encodings that compare equal onto one bit pattern.
fn canonical_f64(n: f64) -> f64 {
    if n == 0.0 {
        0.0
    } else if n.is_nan() {
        f64::NAN
    } else {
        n
    }
}

/// Encode `doc` into `writer`.
pub fn encode_document<W: Write>(writer: W, doc: &Document, mode: EncodeMode) -> CodecResult<()> {
    TagEncoder::new(writer, mode).encode_document(doc)
}

/// Encode `doc` into a fresh buffer.
pub fn to_bytes(doc: &Document, mode: EncodeMode) -> CodecResult<Vec<u8>> {
    let mut encoder = TagEncoder::new(Vec::new(), mode);
    encoder.encode_document(doc)?;
    Ok(encoder.into_inner())
}
