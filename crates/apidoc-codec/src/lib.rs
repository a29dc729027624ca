//! Binary wire codec for API documents.
//!
//! Documents are written as a tag stream: every scalar is a one-byte
//! [`TagType`] followed by a fixed-layout payload, and every container is
//! bracketed by start/end tags. Integers inside payloads are little-endian.
//!
//! # Layers
//!
//! - [`TagEncoder`] / [`TagDecoder`] -- streaming tag codec over any
//!   `io::Write` / `io::Read`
//! - [`EncodeMode`] -- natural key order for persistence, sorted keys for
//!   content hashing
//! - [`DocumentCodec`] -- the persisted-blob envelope (snappy- or
//!   zstd-compressed binary form, with a CRC-32 + JSON legacy fallback on
//!   read)
//!
//! Decoding never panics on malformed input: every failure is a
//! [`CodecError`] carrying the byte offset where it was detected.

pub mod config;
pub mod decode;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod tag;

pub use config::{CodecConfig, Compression};
pub use decode::{decode_value, from_bytes, TagDecoder};
pub use encode::{encode_document, to_bytes, EncodeMode, TagEncoder};
pub use envelope::{DocumentCodec, BINARY_FORMAT_CODE};
pub use error::{CodecError, CodecResult};
pub use tag::TagType;

#[cfg(test)]
mod tests {
    use apidoc_types::arbitrary::{arb_document, arb_value};
    use apidoc_types::{Document, Value};
    use proptest::prelude::*;

    use super::*;

    fn nested_doc() -> Document {
        let mut c = Document::new();
        c.insert("d", Value::Null);
        let mut doc = Document::new();
        doc.insert("a", 1.0);
        doc.insert("b", vec![Value::from(1.0), Value::from(2.0), Value::from("x")]);
        doc.insert("c", c);
        doc
    }

    #[test]
    fn every_layer_roundtrips_the_same_document() {
        let doc = nested_doc();
        let config = CodecConfig::default();
        let codec = DocumentCodec::new(config.clone());

        let natural = to_bytes(&doc, EncodeMode::Natural).unwrap();
        assert_eq!(from_bytes(&natural, &config).unwrap(), doc);

        let canonical = to_bytes(&doc, EncodeMode::Canonical).unwrap();
        assert_eq!(from_bytes(&canonical, &config).unwrap(), doc);

        assert_eq!(codec.unmarshal(&codec.marshal(&doc).unwrap()).unwrap(), doc);
        assert_eq!(
            codec.unmarshal(&codec.marshal_legacy(&doc).unwrap()).unwrap(),
            doc
        );
    }

    proptest! {
        #[test]
        fn tag_stream_roundtrip(doc in arb_document()) {
            let config = CodecConfig::default();
            for mode in [EncodeMode::Natural, EncodeMode::Canonical] {
                let bytes = to_bytes(&doc, mode).unwrap();
                prop_assert_eq!(from_bytes(&bytes, &config).unwrap(), doc.clone());
            }
        }

        #[test]
        fn canonical_bytes_ignore_insertion_order(doc in arb_document()) {
            let mut keys = doc.keys_sorted();
            keys.reverse();
            let rebuilt: Document = keys
                .into_iter()
                .filter_map(|k| doc.get(k).map(|v| (k, v.clone())))
                .collect();
            prop_assert_eq!(
                to_bytes(&doc, EncodeMode::Canonical).unwrap(),
                to_bytes(&rebuilt, EncodeMode::Canonical).unwrap()
            );
        }

        #[test]
        fn single_value_roundtrip(value in arb_value()) {
            let mut encoder = TagEncoder::new(Vec::new(), EncodeMode::Natural);
            encoder.encode_value(&value).unwrap();
            let bytes = encoder.into_inner();
            prop_assert_eq!(decode_value(&bytes, &CodecConfig::default()).unwrap(), value);
        }

        #[test]
        fn envelope_roundtrip(doc in arb_document()) {
            let codec = DocumentCodec::default();
            let binary = codec.marshal(&doc).unwrap();
            prop_assert_eq!(codec.unmarshal(&binary).unwrap(), doc.clone());
            let legacy = codec.marshal_legacy(&doc).unwrap();
            prop_assert_eq!(codec.unmarshal(&legacy).unwrap(), doc);
        }

        #[test]
        fn decoder_never_panics_on_garbage(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = from_bytes(&data, &CodecConfig::default());
            let _ = DocumentCodec::default().unmarshal(&data);
        }
    }
}
