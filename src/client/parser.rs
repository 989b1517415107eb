//! Raw response parsing and normalization.
//!
//! [`ResponseParser`] turns the transport's raw outcome into a
//! [`RestResponse`]:
//!
//! 1. Split the raw buffer on the first blank line (`\r\n\r\n`) into a
//!    header block and a body block; an empty buffer yields empty headers
//!    and an empty body.
//! 2. Parse the header block line by line. A line containing `:` splits into
//!    trimmed name/value; a line without one (the status line) is stored
//!    keyed by itself so error classification can surface it later.
//! 3. If the configured metadata header is present, JSON-decode it into the
//!    initial metadata mapping and remove it from the exposed header set.
//! 4. Populate status and transport diagnostics from the transport outcome;
//!    the status line in the header block never overrides them.
//! 5. Negotiate the actual content type from the `content-type` header
//!    (falling back to the accept format's primary MIME type) and decode the
//!    body in place.
//!
//! # Examples
//!
//! ```
//! use restwire::client::ResponseParser;
//! use serde_json::json;
//!
//! let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"a\":1}";
//! let parser = ResponseParser::new("X-Auth-Meta");
//! let response = parser.parse(raw, 200, "", 0, "json").unwrap();
//! assert_eq!(response.body, json!({"a": 1}));
//! ```

use crate::client::response::RestResponse;
use crate::error::Result;
use crate::{codec, format};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// An insertion-ordered header map.
///
/// Header order is preserved so the raw status-line entry stays first and
/// notification extraction finds it deterministically. Writes to an existing
/// name replace its value in place; name lookups come in case-sensitive and
/// case-insensitive flavors because transports differ in how they report
/// header casing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header map.
    pub fn new() -> Self {
        Headers::default()
    }

    /// Insert a header, replacing the value of an existing name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive name lookup.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Remove a header by case-insensitive name, returning its value.
    pub fn remove_ignore_case(&mut self, name: &str) -> Option<String> {
        let position = self
            .entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(position).1)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Iterate names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Split a raw response buffer into its header block and body.
///
/// The split is on the first blank line; a buffer without one is all
/// headers. Bytes are interpreted lossily as UTF-8.
pub fn split_raw(raw: &[u8]) -> (Headers, String) {
    let mut headers = Headers::new();
    if raw.is_empty() {
        return (headers, String::new());
    }
    let text = String::from_utf8_lossy(raw);
    let (header_block, body) = match text.find("\r\n\r\n") {
        Some(position) => (&text[..position], &text[position + 4..]),
        None => (text.as_ref(), ""),
    };
    for line in header_block.split("\r\n") {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((name, value)) => headers.insert(name.trim(), value.trim()),
            // The status line has no colon and is stored keyed by itself.
            None => headers.insert(line, line),
        }
    }
    (headers, body.to_string())
}

/// Normalizes raw transport outcomes into [`RestResponse`] values.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    meta_header: String,
}

impl ResponseParser {
    /// Create a parser that extracts the given metadata header.
    pub fn new(meta_header: impl Into<String>) -> Self {
        ResponseParser {
            meta_header: meta_header.into(),
        }
    }

    /// Parse a raw exchange outcome into a normalized response.
    ///
    /// `status`, `transport_error` and `transport_error_code` come from the
    /// transport; `accept` is the format name the call asked for and supplies
    /// the fallback MIME type when the response declares no content type.
    ///
    /// # Errors
    ///
    /// Propagates [`RestError::Decode`](crate::RestError::Decode) when the
    /// negotiated content type claims JSON or XML but the body fails to
    /// parse. A decode failure is distinct from an HTTP failure and can
    /// occur on a 200 status.
    pub fn parse(
        &self,
        raw: &[u8],
        status: u16,
        transport_error: &str,
        transport_error_code: i32,
        accept: &str,
    ) -> Result<RestResponse> {
        let (mut headers, body) = split_raw(raw);

        let mut response = RestResponse::default();
        if let Some(meta) = headers.remove_ignore_case(&self.meta_header) {
            // Non-object metadata decodes are ignored, not errors.
            if let Ok(Value::Object(map)) = serde_json::from_str(&meta) {
                response.apply_meta(&map);
            }
        }

        response.headers = headers;
        response.status = status;
        response.transport_error = transport_error.to_string();
        response.transport_error_code = transport_error_code;

        let declared = response
            .headers
            .get_ignore_case("content-type")
            .map(str::to_string)
            .unwrap_or_else(|| format::resolve(accept).accepts[0].to_string());
        let negotiated = format::match_content_type(&declared);
        tracing::trace!(?negotiated, status, "normalizing response body");
        response.body = codec::decode(&body, negotiated)?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RestError;
    use serde_json::json;

    const RAW_JSON: &[u8] =
        b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"a\":1}";

    #[test]
    fn test_headers_insert_replaces_in_place() {
        let mut headers = Headers::new();
        headers.insert("A", "1");
        headers.insert("B", "2");
        headers.insert("A", "3");
        assert_eq!(headers.get("A"), Some("3"));
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.keys().next(), Some("A"));
    }

    #[test]
    fn test_headers_case_insensitive_lookup() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/xml");
        assert_eq!(headers.get("content-type"), None);
        assert_eq!(headers.get_ignore_case("content-type"), Some("text/xml"));
    }

    #[test]
    fn test_split_raw_empty() {
        let (headers, body) = split_raw(b"");
        assert!(headers.is_empty());
        assert_eq!(body, "");
    }

    #[test]
    fn test_split_raw_status_line_keyed_by_itself() {
        let (headers, body) = split_raw(RAW_JSON);
        assert_eq!(headers.get("HTTP/1.1 200 OK"), Some("HTTP/1.1 200 OK"));
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
        assert_eq!(body, "{\"a\":1}");
    }

    #[test]
    fn test_split_raw_value_with_colon() {
        let (headers, _) = split_raw(b"Location: http://example.com/x\r\n\r\n");
        assert_eq!(headers.get("Location"), Some("http://example.com/x"));
    }

    #[test]
    fn test_split_raw_no_blank_line() {
        let (headers, body) = split_raw(b"X-One: 1\r\nX-Two: 2");
        assert_eq!(headers.len(), 2);
        assert_eq!(body, "");
    }

    #[test]
    fn test_parse_decodes_json_body() {
        let parser = ResponseParser::new("X-Auth-Meta");
        let response = parser.parse(RAW_JSON, 200, "", 0, "json").unwrap();
        assert_eq!(response.body, json!({"a": 1}));
        assert_eq!(response.status, 200);
        assert_eq!(
            response.headers.get("HTTP/1.1 200 OK"),
            Some("HTTP/1.1 200 OK")
        );
    }

    #[test]
    fn test_parse_status_comes_from_transport_not_header_block() {
        let parser = ResponseParser::new("X-Auth-Meta");
        let response = parser.parse(RAW_JSON, 201, "", 0, "json").unwrap();
        assert_eq!(response.status, 201);
    }

    #[test]
    fn test_parse_meta_header_merged_and_removed() {
        let raw = b"HTTP/1.1 200 OK\r\nX-Auth-Meta: {\"total\":42}\r\nContent-Type: application/json\r\n\r\n{}";
        let parser = ResponseParser::new("X-Auth-Meta");
        let response = parser.parse(raw, 200, "", 0, "json").unwrap();
        assert_eq!(response.total, 42);
        assert!(response.headers.get_ignore_case("X-Auth-Meta").is_none());
    }

    #[test]
    fn test_parse_meta_header_case_insensitive() {
        let raw = b"HTTP/1.1 200 OK\r\nx-auth-meta: {\"count\":2}\r\n\r\n";
        let parser = ResponseParser::new("X-Auth-Meta");
        let response = parser.parse(raw, 200, "", 0, "txt").unwrap();
        assert_eq!(response.count, 2);
    }

    #[test]
    fn test_parse_non_object_meta_ignored() {
        let raw = b"HTTP/1.1 200 OK\r\nX-Auth-Meta: [1,2]\r\n\r\n";
        let parser = ResponseParser::new("X-Auth-Meta");
        let response = parser.parse(raw, 200, "", 0, "txt").unwrap();
        assert_eq!(response.count, 0);
    }

    #[test]
    fn test_parse_content_type_with_charset() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json; charset=utf-8\r\n\r\n{\"b\":2}";
        let parser = ResponseParser::new("X-Auth-Meta");
        let response = parser.parse(raw, 200, "", 0, "txt").unwrap();
        assert_eq!(response.body, json!({"b": 2}));
    }

    #[test]
    fn test_parse_missing_content_type_falls_back_to_accept() {
        let raw = b"HTTP/1.1 200 OK\r\n\r\n{\"c\":3}";
        let parser = ResponseParser::new("X-Auth-Meta");
        let response = parser.parse(raw, 200, "", 0, "json").unwrap();
        assert_eq!(response.body, json!({"c": 3}));
    }

    #[test]
    fn test_parse_unknown_content_type_leaves_body_raw() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\n\r\npayload";
        let parser = ResponseParser::new("X-Auth-Meta");
        let response = parser.parse(raw, 200, "", 0, "json").unwrap();
        assert_eq!(response.body, Value::String("payload".to_string()));
    }

    #[test]
    fn test_parse_xml_body() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/xml\r\n\r\n<root><a>1</a></root>";
        let parser = ResponseParser::new("X-Auth-Meta");
        let response = parser.parse(raw, 200, "", 0, "xml").unwrap();
        assert_eq!(response.body, json!({"a": {"@value": "1"}}));
    }

    #[test]
    fn test_parse_malformed_json_is_decode_error() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{broken";
        let parser = ResponseParser::new("X-Auth-Meta");
        let err = parser.parse(raw, 200, "", 0, "json").unwrap_err();
        assert!(matches!(err, RestError::Decode { format: "json", .. }));
    }

    #[test]
    fn test_parse_transport_failure_with_empty_buffer() {
        let parser = ResponseParser::new("X-Auth-Meta");
        let response = parser
            .parse(b"", 0, "connection refused", 7, "json")
            .unwrap();
        assert_eq!(response.transport_error_code, 7);
        assert_eq!(response.transport_error, "connection refused");
        assert!(response.is_error());
    }
}
