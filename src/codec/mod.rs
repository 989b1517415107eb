//! Payload encoding and decoding per negotiated format.
//!
//! The codec maps between the structured value model ([`serde_json::Value`])
//! and wire representations:
//!
//! | Format | Outgoing encoding | Incoming decoding |
//! |--------|-------------------|-------------------|
//! | `json` | HTML-safe JSON | strict JSON parse |
//! | `xml` | `<response>`-wrapped element tree | element tree → value |
//! | anything else | `application/x-www-form-urlencoded` | raw string passthrough |
//!
//! A payload that is already a raw string is passed through unmodified in
//! every direction, so callers can hand over pre-encoded bodies.
//!
//! # Examples
//!
//! ```
//! use restwire::codec;
//! use serde_json::json;
//!
//! // HTML-safe JSON escaping permits embedding in markup.
//! assert_eq!(codec::encode(&json!({"a": "<b>"}), "json"), r#"{"a":"\u003Cb\u003E"}"#);
//!
//! // Non-JSON/XML formats flatten to form-urlencoded pairs.
//! assert_eq!(codec::encode(&json!({"a": {"b": "c"}}), "txt"), "a%5Bb%5D=c");
//! ```

pub mod xml;

pub use xml::{value_to_xml, xml_to_value};

use crate::error::{RestError, Result};
use serde_json::Value;

/// Encode a structured value into the wire representation for a format name.
///
/// Raw strings pass through unmodified for every format. Scalars under a
/// non-JSON/XML format render as their plain text form.
pub fn encode(value: &Value, format: &str) -> String {
    match format {
        "json" => match value {
            Value::String(raw) => raw.clone(),
            other => escape_html(&serde_json::to_string(other).unwrap_or_default()),
        },
        "xml" => match value {
            Value::String(raw) => raw.clone(),
            other => xml::value_to_xml(other),
        },
        _ => match value {
            Value::Object(_) | Value::Array(_) => query_string(value),
            Value::String(raw) => raw.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        },
    }
}

/// Decode a raw body according to the negotiated format.
///
/// `None` marks an unknown content type: the body stays a raw string. An
/// empty body never reaches a parser, it decodes to the empty string.
///
/// # Errors
///
/// Malformed JSON or XML under a matching negotiated format is a
/// [`RestError::Decode`] rather than a silently empty body.
pub fn decode(body: &str, negotiated: Option<&str>) -> Result<Value> {
    if body.is_empty() {
        return Ok(Value::String(String::new()));
    }
    match negotiated {
        Some("json") => serde_json::from_str(body).map_err(|e| RestError::Decode {
            format: "json",
            detail: e.to_string(),
        }),
        Some("xml") => xml::xml_to_value(body),
        _ => Ok(Value::String(body.to_string())),
    }
}

/// Flatten a structured value into percent-encoded `key=value` pairs joined
/// by `&`, with nested keys in bracket notation (`a[b][0]=c`).
pub fn query_string(data: &Value) -> String {
    let mut pairs = Vec::new();
    flatten(None, data, &mut pairs);
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn flatten(prefix: Option<&str>, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let composed = match prefix {
                    Some(parent) => format!("{parent}[{key}]"),
                    None => key.clone(),
                };
                flatten(Some(&composed), child, pairs);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let composed = match prefix {
                    Some(parent) => format!("{parent}[{index}]"),
                    None => index.to_string(),
                };
                flatten(Some(&composed), child, pairs);
            }
        }
        // Null-valued keys are dropped from the pair list.
        Value::Null => {}
        scalar => {
            if let Some(key) = prefix {
                pairs.push((key.to_string(), scalar_pair_text(scalar)));
            }
        }
    }
}

fn scalar_pair_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        other => other.to_string(),
    }
}

/// Post-process serialized JSON into its HTML-safe form: `<`, `>`, `&` and
/// both quote characters become `\uXXXX` escapes so the output can be
/// embedded in markup. Structural quotes are untouched; only quotes already
/// escaped inside string values are rewritten.
fn escape_html(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '&' => out.push_str("\\u0026"),
            '\'' => out.push_str("\\u0027"),
            '\\' => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    out.push_str("\\u0022");
                } else {
                    out.push(c);
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}
