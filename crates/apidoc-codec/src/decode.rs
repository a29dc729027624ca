use std::io::{self, Read};

use apidoc_types::{Document, Value};

use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::tag::TagType;

/// Upper bound on the buffer reserved up front for a string payload. Longer
/// strings grow as bytes actually arrive.
const MAX_STRING_PREALLOC: usize = 64 * 1024;

/// Rebuilds a document tree from a tag stream, one tag at a time.
///
/// Short reads are retried until the required byte count arrives; an end
/// of stream in the middle of a value is [`CodecError::Truncated`].
pub struct TagDecoder<R> {
    reader: R,
    offset: u64,
    depth: usize,
    max_depth: usize,
}

impl<R: Read> TagDecoder<R> {
    pub fn new(reader: R, max_depth: usize) -> Self {
        Self {
            reader,
            offset: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Decode one complete value of any kind.
    pub fn decode_value(&mut self) -> CodecResult<Value> {
        let at = self.offset;
        let tag = self.read_tag()?;
        self.value_from_tag(tag, at, "value")
    }

    /// Decode one complete value, which must be a document.
    pub fn decode_document(&mut self) -> CodecResult<Document> {
        match self.decode_value()? {
            Value::Document(doc) => Ok(doc),
            other => Err(CodecError::NotADocument { found: other.kind() }),
        }
    }

    /// Consume the decoder, failing if any input remains.
    pub fn finish(mut self) -> CodecResult<()> {
        let count = io::copy(&mut self.reader, &mut io::sink())?;
        if count > 0 {
            return Err(CodecError::TrailingBytes {
                count: usize::try_from(count).unwrap_or(usize::MAX),
                offset: self.offset,
            });
        }
        Ok(())
    }

    fn value_from_tag(&mut self, tag: TagType, at: u64, context: &'static str) -> CodecResult<Value> {
        match tag {
            TagType::Nil => Ok(Value::Null),
            TagType::Bool => self.read_bool().map(Value::Bool),
            TagType::Float64 => self.read_f64().map(Value::Number),
            TagType::String => self.read_string().map(Value::String),
            TagType::ListStart => {
                self.enter(at)?;
                let items = self.read_list_body()?;
                self.depth -= 1;
                Ok(Value::List(items))
            }
            TagType::DocumentStart => {
                self.enter(at)?;
                let doc = self.read_document_body()?;
                self.depth -= 1;
                Ok(Value::Document(doc))
            }
            TagType::ListEnd | TagType::DocumentEnd | TagType::Invalid => {
                Err(CodecError::UnexpectedTag {
                    tag,
                    offset: at,
                    context,
                })
            }
        }
    }

    fn enter(&mut self, at: u64) -> CodecResult<()> {
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthExceeded {
                max_depth: self.max_depth,
                offset: at,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn read_document_body(&mut self) -> CodecResult<Document> {
        let mut doc = Document::new();
        loop {
            let at = self.offset;
            match self.read_tag()? {
                TagType::DocumentEnd => return Ok(doc),
                TagType::String => {
                    let key = self.read_string()?;
                    let value = self.decode_value()?;
                    doc.insert(key, value);
                }
                tag => {
                    return Err(CodecError::UnexpectedTag {
                        tag,
                        offset: at,
                        context: "document key",
                    })
                }
            }
        }
    }

    fn read_list_body(&mut self) -> CodecResult<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            let at = self.offset;
            match self.read_tag()? {
                TagType::ListEnd => return Ok(items),
                tag => items.push(self.value_from_tag(tag, at, "list element")?),
            }
        }
    }

    fn read_tag(&mut self) -> CodecResult<TagType> {
        let at = self.offset;
        let mut byte = [0u8; 1];
        self.fill(&mut byte, "type tag")?;
        TagType::from_type_byte(byte[0]).ok_or(CodecError::UnknownTag {
            tag: byte[0],
            offset: at,
        })
    }

    fn read_bool(&mut self) -> CodecResult<bool> {
        let at = self.offset;
        let mut byte = [0u8; 1];
        self.fill(&mut byte, "bool payload")?;
        match byte[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool {
                byte: other,
                offset: at,
            }),
        }
    }

    fn read_f64(&mut self) -> CodecResult<f64> {
        let mut raw = [0u8; 8];
        self.fill(&mut raw, "float64 payload")?;
        Ok(f64::from_le_bytes(raw))
    }

    fn read_string(&mut self) -> CodecResult<String> {
        let at = self.offset;
        let mut raw_len = [0u8; 8];
        self.fill(&mut raw_len, "string length")?;
        let length = i64::from_le_bytes(raw_len);
        let len = usize::try_from(length)
            .map_err(|_| CodecError::InvalidLength { length, offset: at })?;

        let mut raw = Vec::with_capacity(len.min(MAX_STRING_PREALLOC));
        let read = (&mut self.reader).take(len as u64).read_to_end(&mut raw)?;
        self.offset += read as u64;
        if read < len {
            return Err(CodecError::Truncated {
                offset: self.offset,
                reading: "string payload",
            });
        }
        String::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8 { offset: at })
    }

    fn fill(&mut self, buf: &mut [u8], reading: &'static str) -> CodecResult<()> {
        match self.reader.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(CodecError::Truncated {
                offset: self.offset,
                reading,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Decode exactly one value from `data`.
pub fn decode_value(data: &[u8], config: &CodecConfig) -> CodecResult<Value> {
    let mut decoder = TagDecoder::new(data, config.max_depth);
    let value = decoder.decode_value()?;
    decoder.finish()?;
    Ok(value)
}

/// Decode exactly one document from `data`.
pub fn from_bytes(data: &[u8], config: &CodecConfig) -> CodecResult<Document> {
    match decode_value(data, config)? {
        Value::Document(doc) => Ok(doc),
        other => Err(CodecError::NotADocument { found: other.kind() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{to_bytes, EncodeMode};
    use apidoc_types::ValueKind;

    fn config() -> CodecConfig {
        CodecConfig::default()
    }

    fn scenario() -> Document {
        let mut c = Document::new();
        c.insert("d", Value::Null);
        let mut doc = Document::new();
        doc.insert("a", 1.0);
        doc.insert("b", vec![Value::from(1.0), Value::from(2.0), Value::from("x")]);
        doc.insert("c", c);
        doc
    }

    fn sample_doc() -> Document {
        let mut doc = Document::new();
        doc.insert("name", "Jon Vain");
        doc.insert("income", 14900.58);
        doc.insert("employed", true);
        doc.insert("notoriety", 5.0);
        doc.insert("useful", Value::Null);
        doc.insert("friends", vec![
            Value::from("Joe Strong"),
            Value::from("Tim Bleak"),
            Value::from("Judith Believable"),
        ]);
        doc.insert("matrix", vec![
            Value::from(vec![Value::from(5.0), Value::from(4.9), Value::from(8.7)]),
            Value::from(vec![Value::from(9.0), Value::from(11.3), Value::from(15.88)]),
        ]);
        doc
    }

    fn big_sample_doc(depth: usize) -> Document {
        let mut doc = Document::new();
        doc.insert("children", vec![Value::from(sample_doc()); 50]);
        if depth > 0 {
            doc.insert("foo", big_sample_doc(depth - 1));
        }
        doc
    }

    /// A reader that hands out at most one byte per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn roundtrip_scenario() {
        let doc = scenario();
        let bytes = to_bytes(&doc, EncodeMode::Natural).unwrap();
        assert_eq!(from_bytes(&bytes, &config()).unwrap(), doc);
    }

    #[test]
    fn roundtrip_samples() {
        for doc in [sample_doc(), big_sample_doc(3)] {
            let bytes = to_bytes(&doc, EncodeMode::Natural).unwrap();
            assert_eq!(from_bytes(&bytes, &config()).unwrap(), doc);
        }
    }

    #[test]
    fn roundtrip_preserves_control_characters_and_empty_containers() {
        let mut doc = Document::new();
        doc.insert("ctl", "a\u{1}b\u{0}");
        doc.insert("", "empty key");
        doc.insert("list", Vec::<Value>::new());
        doc.insert("doc", Document::new());
        doc.insert("neg_zero", -0.0);
        let bytes = to_bytes(&doc, EncodeMode::Natural).unwrap();
        let decoded = from_bytes(&bytes, &config()).unwrap();
        assert_eq!(decoded, doc);
        assert_eq!(decoded.get("ctl"), Some(&Value::from("a\u{1}b\u{0}")));
        let neg = decoded.get("neg_zero").and_then(Value::as_f64).unwrap();
        assert!(neg.is_sign_negative());
    }

    #[test]
    fn short_reads_are_retried() {
        let doc = sample_doc();
        let bytes = to_bytes(&doc, EncodeMode::Natural).unwrap();
        let mut decoder = TagDecoder::new(Trickle(&bytes), 16);
        assert_eq!(decoder.decode_document().unwrap(), doc);
        assert_eq!(decoder.offset(), bytes.len() as u64);
        decoder.finish().unwrap();
    }

    #[test]
    fn every_truncation_is_an_error() {
        let bytes = to_bytes(&scenario(), EncodeMode::Natural).unwrap();
        for cut in 0..bytes.len() {
            let err = from_bytes(&bytes[..cut], &config()).unwrap_err();
            assert!(
                matches!(err, CodecError::Truncated { .. }),
                "cut at {cut}: {err:?}"
            );
        }
    }

    #[test]
    fn unknown_tag_reports_offset() {
        let err = from_bytes(&[6, 42], &config()).unwrap_err();
        assert!(matches!(err, CodecError::UnknownTag { tag: 42, offset: 1 }));
        let err = from_bytes(&[0], &config()).unwrap_err();
        assert!(matches!(err, CodecError::UnknownTag { tag: 0, offset: 0 }));
    }

    #[test]
    fn end_tags_in_value_position_are_rejected() {
        for tag in [TagType::ListEnd, TagType::DocumentEnd] {
            let err = decode_value(&[tag.type_byte()], &config()).unwrap_err();
            assert!(matches!(err, CodecError::UnexpectedTag { offset: 0, .. }));
        }
        // DocumentEnd inside a list.
        let err = decode_value(&[4, 7], &config()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnexpectedTag { tag: TagType::DocumentEnd, offset: 1, .. }
        ));
    }

    #[test]
    fn document_keys_must_be_strings() {
        let err = from_bytes(&[6, 8, 7], &config()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnexpectedTag { tag: TagType::Nil, context: "document key", .. }
        ));
    }

    #[test]
    fn negative_string_length_is_rejected() {
        let mut bytes = vec![6, 1];
        bytes.extend_from_slice(&(-1i64).to_le_bytes());
        let err = from_bytes(&bytes, &config()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidLength { length: -1, offset: 2 }));
    }

    #[test]
    fn forged_length_does_not_allocate_and_reports_truncation() {
        let mut bytes = vec![1];
        bytes.extend_from_slice(&(i64::MAX).to_le_bytes());
        bytes.extend_from_slice(b"abc");
        let err = decode_value(&bytes, &config()).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { offset: 12, .. }));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut bytes = vec![1];
        bytes.extend_from_slice(&2i64.to_le_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe]);
        let err = decode_value(&bytes, &config()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8 { offset: 1 }));
    }

    #[test]
    fn bool_payload_must_be_zero_or_one() {
        assert_eq!(decode_value(&[2, 0], &config()).unwrap(), Value::Bool(false));
        assert_eq!(decode_value(&[2, 1], &config()).unwrap(), Value::Bool(true));
        let err = decode_value(&[2, 2], &config()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidBool { byte: 2, offset: 1 }));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut nested = Value::Null;
        for _ in 0..10 {
            nested = Value::List(vec![nested]);
        }
        let mut doc = Document::new();
        doc.insert("deep", nested);
        let bytes = to_bytes(&doc, EncodeMode::Natural).unwrap();

        // Root document plus ten lists.
        let ok = CodecConfig::default().with_max_depth(11);
        assert_eq!(from_bytes(&bytes, &ok).unwrap(), doc);

        let tight = CodecConfig::default().with_max_depth(10);
        let err = from_bytes(&bytes, &tight).unwrap_err();
        assert!(matches!(err, CodecError::DepthExceeded { max_depth: 10, .. }));
    }

    #[test]
    fn pathological_depth_fails_cleanly() {
        let mut bytes = vec![4u8; 1_000_000];
        bytes.extend(std::iter::repeat(5u8).take(1_000_000));
        let err = decode_value(&bytes, &config()).unwrap_err();
        assert!(matches!(err, CodecError::DepthExceeded { max_depth: 128, offset: 128 }));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = to_bytes(&scenario(), EncodeMode::Natural).unwrap();
        let len = bytes.len() as u64;
        bytes.extend([8, 8]);
        let err = from_bytes(&bytes, &config()).unwrap_err();
        assert!(matches!(err, CodecError::TrailingBytes { count: 2, offset } if offset == len));
    }

    #[test]
    fn non_document_top_level_is_rejected() {
        let err = from_bytes(&[8], &config()).unwrap_err();
        assert!(matches!(err, CodecError::NotADocument { found: ValueKind::Null }));
        assert_eq!(decode_value(&[8], &config()).unwrap(), Value::Null);
    }
}
