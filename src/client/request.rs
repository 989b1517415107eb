//! Per-call configuration and request building.
//!
//! [`CallConfig`] accumulates everything one call needs: method, formats,
//! headers, payload and flags. [`build_request`] is a pure function from a
//! call configuration plus the client's [`Endpoint`] to an immutable
//! [`RequestDescriptor`] ready for the transport. URL assembly, header
//! assembly, payload encoding and basic-auth attachment all happen here.

use crate::codec;
use crate::format;
use crate::transport::{Method, RequestDescriptor};
use serde_json::Value;

/// Where calls go and how they authenticate. Fixed at construction time.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Base service URL; entity paths are concatenated onto it.
    pub url: String,
    /// Access token injected under [`auth_header`](Self::auth_header).
    pub token: Option<String>,
    /// Header name carrying the access token.
    pub auth_header: String,
    /// HTTP Basic credentials (username, password).
    pub credentials: Option<(String, String)>,
}

/// Mutable per-call state, reset to defaults after every completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallConfig {
    /// HTTP method of the call.
    pub method: Method,
    /// Format name governing the `Accept` header and response decoding.
    pub accept: &'static str,
    /// Format name governing the `Content-Type` header and body encoding.
    pub content_type: &'static str,
    /// API version announced in the `X-Api-Version` header.
    pub version: String,
    /// Extra headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Call payload: query string for GET, encoded body for POST/PUT.
    pub data: Value,
    /// Diagnostic echo mode passed to the transport.
    pub verbose: bool,
    /// Return error-classified responses instead of raising them.
    pub ignore_errors: bool,
}

impl Default for CallConfig {
    fn default() -> Self {
        CallConfig {
            method: Method::Get,
            accept: "json",
            content_type: "json",
            version: "1.0".to_string(),
            headers: Vec::new(),
            data: Value::Null,
            verbose: false,
            ignore_errors: false,
        }
    }
}

impl CallConfig {
    /// Whether the payload carries anything worth sending.
    pub fn has_data(&self) -> bool {
        match &self.data {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::String(text) => !text.is_empty(),
            _ => true,
        }
    }
}

/// Build the immutable request descriptor for one call.
///
/// - URL: one leading `/` is stripped from the entity before concatenation
///   onto the base URL; GET calls with payload data append it as a
///   percent-encoded query string, stripping any trailing `?` first.
/// - Headers: `Accept` is the accept format's primary MIME type,
///   `Content-Type` the content-type format's send MIME type;
///   `X-Api-Version` defaults from the call version unless the caller set it
///   explicitly; the access token goes under the endpoint's auth header.
///   Headers with empty values are omitted.
/// - Body: encoded from the payload for POST/PUT only; GET and DELETE never
///   carry one.
pub fn build_request(entity: &str, config: &CallConfig, endpoint: &Endpoint) -> RequestDescriptor {
    let entity = entity.strip_prefix('/').unwrap_or(entity);
    let mut url = format!("{}{}", endpoint.url, entity);
    if config.method == Method::Get && config.has_data() {
        url = format!(
            "{}?{}",
            url.trim_end_matches('?'),
            codec::query_string(&config.data)
        );
    }

    let mut headers: Vec<(String, String)> = Vec::new();
    set_header(&mut headers, "X-Api-Version", &config.version);
    for (name, value) in &config.headers {
        set_header(&mut headers, name, value);
    }
    set_header(&mut headers, "Accept", format::resolve(config.accept).accepts[0]);
    set_header(
        &mut headers,
        "Content-Type",
        format::resolve(config.content_type).send,
    );
    if let Some(token) = &endpoint.token {
        set_header(&mut headers, &endpoint.auth_header, token);
    }
    headers.retain(|(_, value)| !value.is_empty());

    let body = if config.method.allows_body() {
        Some(codec::encode(&config.data, config.content_type))
    } else {
        None
    };

    RequestDescriptor {
        url,
        method: config.method,
        headers,
        body,
        basic_auth: endpoint.credentials.clone(),
        verbose: config.verbose,
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(entry) = headers.iter_mut().find(|(n, _)| n == name) {
        entry.1 = value.to_string();
    } else {
        headers.push((name.to_string(), value.to_string()));
    }
}
