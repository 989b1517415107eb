//! REST client: call building, execution and response normalization.
//!
//! This module provides the full client-side pipeline. A call flows through
//! four stages:
//!
//! 1. **Build** - [`build_request`] turns the accumulated [`CallConfig`] and
//!    the fixed [`Endpoint`] into an immutable request descriptor
//! 2. **Execute** - a [`Transport`](crate::transport::Transport) performs the
//!    exchange and returns raw bytes plus diagnostics
//! 3. **Parse** - [`ResponseParser`] splits the raw buffer, extracts the
//!    metadata header and decodes the body by negotiated content type
//! 4. **Classify** - the error rule decides whether the normalized
//!    [`RestResponse`] is returned or raised
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch    - RestClient orchestrator and terminal verbs
//! ├── request  - Per-call configuration and request building
//! ├── parser   - Raw response splitting and normalization
//! └── response - The RestResponse result entity
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RestClient`] | Fluent client with reset-after-call semantics |
//! | [`CallConfig`] | Mutable per-call state |
//! | [`Endpoint`] | Base URL and authentication, fixed at construction |
//! | [`ResponseParser`] | Raw buffer to [`RestResponse`] normalization |
//! | [`RestResponse`] | Metadata fields plus the decoded body |
//! | [`Headers`] | Ordered, insertion-preserving header map |
//!
//! # Examples
//!
//! ```ignore
//! use restwire::RestClient;
//! use serde_json::json;
//!
//! # async fn run() -> restwire::Result<()> {
//! let mut client = RestClient::new("http://localhost/api/v1.0/")?
//!     .with_token("asdfdsaf-asdfasdf-asdfasdf")?;
//!
//! let users = client.data(json!({"active": true})).get("users").await?;
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod fetch;
mod parser;
mod request;
mod response;

pub use fetch::{ErrorMapper, RestClient};
pub use parser::{split_raw, Headers, ResponseParser};
pub use request::{build_request, CallConfig, Endpoint};
pub use response::RestResponse;
