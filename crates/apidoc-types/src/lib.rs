//! Value model for API documents.
//!
//! A document is a tree of dynamically-typed values as produced by parsing a
//! JSON payload from a remote API. This crate defines the closed set of value
//! kinds and the operations that only need the tree itself.
//!
//! # Key Types
//!
//! - [`Value`] -- null, bool, number (`f64`), string, list, or document
//! - [`Document`] -- string-keyed map of values; the root unit of exchange
//! - [`ApiError`] -- error payload detected inside a document
//!
//! # Operations
//!
//! - Structural equality (`PartialEq`) that ignores key order
//! - Deep copy (`Clone`); containers own their children, so copies never alias
//! - [`Document::traverse`] and [`Document::get_path`]
//! - The JSON projection in [`json`]
//!
//! Documents are not synchronized. Concurrent readers are fine; writers
//! need exclusive access, which `&mut` already enforces.

pub mod api_error;
#[cfg(any(test, feature = "proptest"))]
pub mod arbitrary;
pub mod document;
pub mod error;
pub mod json;
pub mod path;
pub mod value;

pub use api_error::ApiError;
pub use document::Document;
pub use error::{DocumentError, DocumentResult};
pub use value::{numbers_equal, Value, ValueKind};
