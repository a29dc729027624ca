//! JSON projection of documents.
//!
//! Mapping: object ↔ [`Document`], array ↔ list, number ↔ `f64`, `true`/
//! `false` ↔ bool, string ↔ string, `null` ↔ null. Output is canonical:
//! keys are sorted, integral numbers are printed without a fraction, and
//! empty lists are always `[]`. Control characters below U+0020 other than
//! `\b \t \n \f \r` are dropped from strings on output.

use std::borrow::Cow;
use std::fmt;
use std::io::Write;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{DocumentError, DocumentResult};
use crate::value::Value;

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Serialize to compact JSON bytes.
pub fn to_json_vec(doc: &Document) -> DocumentResult<Vec<u8>> {
    check_representable(doc)?;
    Ok(serde_json::to_vec(doc)?)
}

/// Serialize to indented JSON text.
pub fn to_json_string_pretty(doc: &Document) -> DocumentResult<String> {
    check_representable(doc)?;
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Stream compact JSON into `writer` without an intermediate buffer.
pub fn write_json<W: Write>(doc: &Document, writer: W) -> DocumentResult<()> {
    check_representable(doc)?;
    serde_json::to_writer(writer, doc)?;
    Ok(())
}

/// Parse a JSON object into a document.
pub fn from_json_slice(data: &[u8]) -> DocumentResult<Document> {
    Ok(serde_json::from_slice(data)?)
}

/// Parse a JSON object into a document.
pub fn from_json_str(text: &str) -> DocumentResult<Document> {
    Ok(serde_json::from_str(text)?)
}

/// Reject values JSON cannot carry, naming the first offending path.
fn check_representable(doc: &Document) -> DocumentResult<()> {
    let mut path = String::new();
    check_document(doc, &mut path)
}

fn check_document(doc: &Document, path: &mut String) -> DocumentResult<()> {
    for (key, value) in doc {
        let mark = path.len();
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(key);
        check_value(value, path)?;
        path.truncate(mark);
    }
    Ok(())
}

fn check_value(value: &Value, path: &mut String) -> DocumentResult<()> {
    match value {
        Value::Number(n) if !n.is_finite() => Err(DocumentError::UnsupportedValue {
            path: path.clone(),
            reason: format!("non-finite number {n}"),
        }),
        Value::List(items) => {
            for (idx, item) in items.iter().enumerate() {
                let mark = path.len();
                path.push_str(&format!("[{idx}]"));
                check_value(item, path)?;
                path.truncate(mark);
            }
            Ok(())
        }
        Value::Document(child) => check_document(child, path),
        _ => Ok(()),
    }
}

fn strip_control(s: &str) -> Cow<'_, str> {
    let keep = |c: char| c >= ' ' || matches!(c, '\u{8}' | '\t' | '\n' | '\u{c}' | '\r');
    if s.chars().all(keep) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|&c| keep(c)).collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => {
                if !n.is_finite() {
                    Err(ser::Error::custom(format!(
                        "unsupported value: non-finite number {n}"
                    )))
                } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Self::String(s) => serializer.serialize_str(&strip_control(s)),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Document(doc) => doc.serialize(serializer),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter_sorted() {
            map.serialize_entry(&strip_control(key), value)?;
        }
        map.end()
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Value, A::Error> {
        DocumentVisitor.visit_map(map).map(Value::Document)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Document, A::Error> {
        let mut doc = Document::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            doc.insert(key, value);
        }
        Ok(doc)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DocumentVisitor)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match to_json_string_pretty(self) {
            Ok(text) => f.write_str(&text),
            Err(e) => write!(f, "<{e}>"),
        }
    }
}
