//! Error types and result handling for restwire.
//!
//! All fallible operations in this crate return [`Result`], an alias over
//! [`RestError`]. The taxonomy follows the call lifecycle:
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | [`RestError::Config`] | Invalid base URL or malformed credentials, before any network activity |
//! | [`RestError::Http`] | The normalized response classified itself as an error and error raising was not suppressed |
//! | [`RestError::Decode`] | The negotiated content type claimed JSON or XML but the body failed to parse |
//! | [`RestError::Transport`] | The transport collaborator could not be constructed or driven at all |
//!
//! Transport-level diagnostics reported *by* a completed exchange (the curl-error
//! analogue) are not a separate error path: they travel inside the normalized
//! response and contribute to its error classification. A decode failure on a
//! `200` response is deliberately distinct from an HTTP failure: the exchange
//! succeeded, the payload did not.

use crate::client::RestResponse;
use thiserror::Error;

/// Result type alias for restwire operations.
pub type Result<T> = std::result::Result<T, RestError>;

/// Errors produced while building, executing, or normalizing a REST call.
#[derive(Error, Debug)]
pub enum RestError {
    /// Invalid caller-supplied configuration (bad base URL, empty credential).
    ///
    /// Raised immediately at configuration time, never deferred to dispatch.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A classified HTTP failure carrying the full normalized response.
    ///
    /// The notification is a short human-readable marker (usually the raw
    /// status line of the response); the boxed response gives the handler
    /// complete context: headers, decoded body, pagination metadata.
    #[error("{notification}")]
    Http {
        /// Short notification string, e.g. `HTTP/1.1 404 Not Found`.
        notification: String,
        /// The HTTP status code of the failed call.
        status: u16,
        /// The complete normalized response for inspection.
        response: Box<RestResponse>,
    },

    /// The response body did not parse as its negotiated content type.
    #[error("failed to decode {format} response body: {detail}")]
    Decode {
        /// Negotiated format name (`json` or `xml`).
        format: &'static str,
        /// Parser diagnostic text.
        detail: String,
    },

    /// The transport collaborator itself failed outside of an exchange.
    #[error("transport error: {0}")]
    Transport(String),
}

impl RestError {
    /// The normalized response attached to a classified HTTP failure, if any.
    pub fn response(&self) -> Option<&RestResponse> {
        match self {
            RestError::Http { response, .. } => Some(response),
            _ => None,
        }
    }

    /// The HTTP status code attached to a classified HTTP failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_exposes_response() {
        let mut response = RestResponse::default();
        response.status = 404;
        let err = RestError::Http {
            notification: "HTTP/1.1 404 Not Found".to_string(),
            status: 404,
            response: Box::new(response),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.response().map(|r| r.status), Some(404));
        assert_eq!(err.to_string(), "HTTP/1.1 404 Not Found");
    }

    #[test]
    fn test_config_error_has_no_response() {
        let err = RestError::Config("the service URL was not specified".to_string());
        assert!(err.response().is_none());
        assert!(err.status().is_none());
    }
}
