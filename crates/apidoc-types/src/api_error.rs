//! Detection of error payloads returned by the upstream API.

use thiserror::Error;

use crate::document::Document;
use crate::value::Value;

/// An error reported by the upstream API inside an otherwise valid document.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("API error for {uri} HTTP status {status_code}: {message}")]
pub struct ApiError {
    /// Identifier of the resource the document was fetched from.
    pub uri: String,
    pub status_code: i64,
    pub message: String,
}

/// Field names the API has used for the status code, in lookup order.
const STATUS_FIELDS: [&str; 2] = ["http_status_code", "status"];
const MESSAGE_FIELD: &str = "message";

impl Document {
    /// Interpret this document as an API error payload.
    ///
    /// A payload is an error when it carries a numeric status code (under
    /// `http_status_code`, or else `status`) and a string `message`. Anything
    /// else, including mistyped fields, is not an error and yields `None`.
    pub fn api_error(&self, uri: &str) -> Option<ApiError> {
        let message = self.get(MESSAGE_FIELD)?;
        let status = STATUS_FIELDS.iter().find_map(|field| self.get(field))?;
        match (status, message) {
            (Value::Number(code), Value::String(message)) => Some(ApiError {
                uri: uri.to_owned(),
                status_code: *code as i64,
                message: message.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(status_field: &str, code: Value, message: Value) -> Document {
        let mut doc = Document::new();
        doc.insert(status_field, code);
        doc.insert("message", message);
        doc
    }

    #[test]
    fn detects_http_status_code() {
        let doc = payload("http_status_code", Value::from(404), Value::from("Not found"));
        let err = doc.api_error("/departures/1").unwrap();
        assert_eq!(err.status_code, 404);
        assert_eq!(err.message, "Not found");
        assert_eq!(err.uri, "/departures/1");
        assert_eq!(
            err.to_string(),
            "API error for /departures/1 HTTP status 404: Not found"
        );
    }

    #[test]
    fn detects_status_alias() {
        let doc = payload("status", Value::from(500), Value::from("boom"));
        assert_eq!(doc.api_error("u").map(|e| e.status_code), Some(500));
    }

    #[test]
    fn http_status_code_takes_precedence() {
        let mut doc = payload("http_status_code", Value::from(401), Value::from("no"));
        doc.insert("status", 200);
        assert_eq!(doc.api_error("u").map(|e| e.status_code), Some(401));
    }

    #[test]
    fn regular_document_is_not_an_error() {
        let mut doc = Document::new();
        doc.insert("href", "https://example.com/departures/1");
        doc.insert("name", "Tour");
        assert!(doc.api_error("u").is_none());
    }

    #[test]
    fn mistyped_fields_are_not_an_error() {
        let doc = payload("http_status_code", Value::from("404"), Value::from("x"));
        assert!(doc.api_error("u").is_none());
        let doc = payload("status", Value::from(404), Value::Null);
        assert!(doc.api_error("u").is_none());
    }

    #[test]
    fn missing_message_is_not_an_error() {
        let mut doc = Document::new();
        doc.insert("status", 404);
        assert!(doc.api_error("u").is_none());
    }
}
