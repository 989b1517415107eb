//! The uniform result entity produced by response parsing.
//!
//! [`RestResponse`] is a fixed, statically-typed schema of metadata fields
//! (pagination hints, messages, tracing token) alongside the decoded body,
//! the parsed headers, and the transport diagnostics. Services report the
//! metadata out-of-band in a JSON-encoded header; [`RestResponse::apply_meta`]
//! merges that mapping field by field, ignoring unknown names and values of
//! the wrong kind so a tampered metadata header can never change field
//! semantics. In the dynamic original both guards were silent runtime no-ops;
//! here unknown fields are unrepresentable and the kind checks are explicit.
//!
//! # Examples
//!
//! ```
//! use restwire::client::RestResponse;
//!
//! let response = RestResponse::default();
//! assert_eq!(response.status, 200);
//! assert_eq!(response.page, 1);
//! assert!(!response.is_error());
//! ```

use crate::client::parser::Headers;
use serde::Serialize;
use serde_json::{Map, Value};

/// A normalized REST response: metadata fields plus the decoded body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestResponse {
    /// Number of records in this page.
    pub count: u64,
    /// Total records across all pages.
    pub total: u64,
    /// Page size limit.
    pub limit: u64,
    /// Record offset of this page.
    pub offset: u64,
    /// Current page number.
    pub page: u64,
    /// Total number of pages.
    pub pages: u64,
    /// Ordering applied by the service.
    pub order: Vec<Value>,
    /// Canonical link to this resource.
    #[serde(rename = "self")]
    pub self_link: String,
    /// Service messages attached to the call.
    pub messages: Vec<Value>,
    /// Tracing or continuation token.
    pub token: String,
    /// Filters applied by the service.
    pub filters: Value,
    /// Field selection applied by the service.
    pub fields: Value,
    /// Method echoed by the service.
    pub method: String,
    /// Auxiliary data reported by the service.
    pub data: Option<Value>,
    /// HTTP status code of the exchange (from the transport, not the header
    /// block).
    pub status: u16,
    /// Decoded body: a structured value for JSON/XML, a raw string otherwise.
    pub body: Value,
    /// Parsed response headers, including the raw status line keyed by itself.
    pub headers: Headers,
    /// Transport-level error text, empty on success.
    pub transport_error: String,
    /// Transport-level error code, `0` on success.
    pub transport_error_code: i32,
}

impl Default for RestResponse {
    fn default() -> Self {
        RestResponse {
            count: 0,
            total: 0,
            limit: 0,
            offset: 0,
            page: 1,
            pages: 1,
            order: Vec::new(),
            self_link: String::new(),
            messages: Vec::new(),
            token: String::new(),
            filters: Value::Array(Vec::new()),
            fields: Value::Array(Vec::new()),
            method: String::new(),
            data: None,
            status: 200,
            body: Value::String(String::new()),
            headers: Headers::new(),
            transport_error: String::new(),
            transport_error_code: 0,
        }
    }
}

impl RestResponse {
    /// Merge a decoded metadata mapping into the named fields.
    ///
    /// Unknown names are skipped, as are values whose kind does not match the
    /// field (a string where a count belongs, a scalar where a list belongs).
    /// `data` is untyped and accepts any value. The exchange-owned fields
    /// (`status`, `body`, `headers`, transport diagnostics) are not settable
    /// from metadata; the parser populates them afterwards.
    pub fn apply_meta(&mut self, meta: &Map<String, Value>) {
        for (name, value) in meta {
            match name.as_str() {
                "count" => {
                    if let Some(n) = value.as_u64() {
                        self.count = n;
                    }
                }
                "total" => {
                    if let Some(n) = value.as_u64() {
                        self.total = n;
                    }
                }
                "limit" => {
                    if let Some(n) = value.as_u64() {
                        self.limit = n;
                    }
                }
                "offset" => {
                    if let Some(n) = value.as_u64() {
                        self.offset = n;
                    }
                }
                "page" => {
                    if let Some(n) = value.as_u64() {
                        self.page = n;
                    }
                }
                "pages" => {
                    if let Some(n) = value.as_u64() {
                        self.pages = n;
                    }
                }
                "order" => {
                    if let Value::Array(items) = value {
                        self.order = items.clone();
                    }
                }
                "self" => {
                    if let Value::String(text) = value {
                        self.self_link = text.clone();
                    }
                }
                "messages" => {
                    if let Value::Array(items) = value {
                        self.messages = items.clone();
                    }
                }
                "token" => {
                    if let Value::String(text) = value {
                        self.token = text.clone();
                    }
                }
                "filters" => {
                    if value.is_array() || value.is_object() {
                        self.filters = value.clone();
                    }
                }
                "fields" => {
                    if value.is_array() || value.is_object() {
                        self.fields = value.clone();
                    }
                }
                "method" => {
                    if let Value::String(text) = value {
                        self.method = text.clone();
                    }
                }
                "data" => self.data = Some(value.clone()),
                _ => {}
            }
        }
    }

    /// Whether this response classifies as a failure: a non-zero transport
    /// error code, or an HTTP status above 300.
    ///
    /// The boundary is exclusive at 300: a 300 status is not an error, 301
    /// and up are. Preserved verbatim for compatibility with existing
    /// callers.
    pub fn is_error(&self) -> bool {
        self.transport_error_code != 0 || self.status > 300
    }

    /// Short notification string for this response: the raw status line
    /// captured in the header block (any key beginning with `HTTP`), falling
    /// back to the numeric status.
    pub fn notification(&self) -> String {
        self.headers
            .keys()
            .find(|key| key.starts_with("HTTP"))
            .map(str::to_string)
            .unwrap_or_else(|| self.status.to_string())
    }

    /// The HTTP status code of the exchange.
    pub fn http_status_code(&self) -> u16 {
        self.status
    }
}
