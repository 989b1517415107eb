#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Restwire: REST calls in, normalized responses out
//!
//! This crate implements a generic REST client pipeline: a fluent call
//! builder, pluggable payload codecs with content-type negotiation, a
//! transport seam for the actual network I/O, and a response normalizer that
//! turns raw `header block + body` buffers into a uniform result entity.
//!
//! ## Overview
//!
//! The pipeline is composed of four independent layers:
//!
//! 1. **Formats** - A registry mapping short format names (`json`, `xml`,
//!    `txt`, ...) to the MIME types they accept and send
//! 2. **Codecs** - Payload encoding (HTML-safe JSON, XML trees, form-encoded
//!    query strings) and body decoding by negotiated content type
//! 3. **Transport** - An async trait seam; the reqwest-backed default
//!    reconstructs the raw response buffer the parser consumes
//! 4. **Client** - The [`RestClient`] orchestrator: fluent per-call
//!    configuration, terminal verbs, error classification, and an
//!    unconditional reset to defaults after every call
//!
//! ## Key Features
//!
//! - **Content negotiation**: the `Accept` format drives decoding, the
//!   response's own `Content-Type` header wins when recognized
//! - **Bidirectional XML**: structured values render to XML and parse back
//!   with `@attributes`/`@value` annotation and singleton collapse
//! - **Out-of-band metadata**: pagination and tracing fields arrive in a
//!   JSON-encoded header and merge into typed [`RestResponse`] fields
//! - **Error classification**: transport failures and HTTP statuses above
//!   300 raise [`RestError::Http`] carrying the full normalized response,
//!   or are returned intact under `ignore_errors`
//! - **Pluggable transport**: swap the network layer for a test double
//!   without touching the pipeline
//!
//! ## Quick Start
//!
//! ```ignore
//! use restwire::RestClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> restwire::Result<()> {
//!     let mut client = RestClient::new("http://localhost/api/v1.0/")?
//!         .with_token("asdfdsaf-asdfasdf-asdfasdf")?;
//!
//!     let users = client.data(json!({"param1": "value1"})).get("users").await?;
//!     println!("{users}");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Call building, execution, response normalization |
//! | [`codec`] | Payload encoding and body decoding |
//! | [`format`] | Format registry and content-type negotiation |
//! | [`transport`] | The transport seam and the reqwest-backed default |
//! | [`error`] | Error types and the crate-wide [`Result`] alias |

pub mod client;
pub mod codec;
pub mod error;
pub mod format;
pub mod transport;

pub use client::{CallConfig, ErrorMapper, Headers, ResponseParser, RestClient, RestResponse};
pub use error::{RestError, Result};
pub use format::Format;
pub use transport::{
    HttpTransport, Method, RequestDescriptor, Transport, TransportConfig, TransportResult,
};

/// Structured payload and body values are plain `serde_json` values.
pub use serde_json::Value;
