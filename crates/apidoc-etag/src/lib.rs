//! Content tags for API documents.
//!
//! An [`ETag`] is the 64-bit FNV-1a hash of a document's canonical tag
//! stream (sorted keys, normalized numbers), so two documents that compare
//! equal always share a tag. Tags are cheap change detectors, not
//! cryptographic digests.
//!
//! ```
//! use apidoc_etag::ETag;
//! use apidoc_types::Document;
//!
//! let mut doc = Document::new();
//! doc.insert("name", "foo");
//! let tag = ETag::compute(&doc).unwrap();
//! assert_eq!(tag, tag.to_string().parse::<ETag>().unwrap());
//! ```

pub mod error;
pub mod etag;
pub mod fnv;

pub use error::{EtagError, EtagResult};
pub use etag::ETag;
pub use fnv::Fnv1a64;

#[cfg(test)]
mod tests {
    use apidoc_codec::{to_bytes, DocumentCodec, EncodeMode};
    use apidoc_types::arbitrary::arb_document;
    use apidoc_types::Document;
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn tag_hashes_canonical_bytes(doc in arb_document()) {
            let bytes = to_bytes(&doc, EncodeMode::Canonical).unwrap();
            let mut h = Fnv1a64::new();
            h.update(&bytes);
            prop_assert_eq!(ETag::compute(&doc).unwrap().value(), h.digest());
        }

        #[test]
        fn equal_documents_share_tags(doc in arb_document()) {
            let rebuilt: Document = doc.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            prop_assert_eq!(&doc, &rebuilt);
            prop_assert_eq!(ETag::compute(&doc).unwrap(), ETag::compute(&rebuilt).unwrap());
        }

        #[test]
        fn tag_survives_envelope_roundtrip(doc in arb_document()) {
            let codec = DocumentCodec::default();
            let restored = codec.unmarshal(&codec.marshal(&doc).unwrap()).unwrap();
            prop_assert_eq!(ETag::compute(&doc).unwrap(), ETag::compute(&restored).unwrap());
        }

        #[test]
        fn text_form_roundtrips(value in any::<u64>()) {
            let tag = ETag::new(value);
            prop_assert_eq!(tag.to_string().parse::<ETag>().unwrap(), tag);
        }
    }
}
