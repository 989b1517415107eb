//! The REST client orchestrator.
//!
//! [`RestClient`] is a stateful fluent configuration holder. Each call runs
//! build → transport → parse → classify, then unconditionally resets the
//! per-call configuration to defaults so a reused instance never leaks state
//! into the next call, even when the call raised. A client represents at
//! most one in-flight call; it takes `&mut self` on every terminal verb, so
//! concurrent reuse of one instance is a compile-time impossibility rather
//! than a documented hazard.
//!
//! # Examples
//!
//! ```ignore
//! use restwire::RestClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> restwire::Result<()> {
//!     let mut client = RestClient::new("http://localhost/api/v1.0/")?
//!         .with_token("asdfdsaf-asdfasdf-asdfasdf")?
//!         .with_credentials("fredflintstone", "iluvbetty")?;
//!
//!     // GET with query parameters.
//!     let users = client.data(json!({"param1": "value1"})).get("users").await?;
//!
//!     // POST a JSON payload.
//!     let created = client.data(json!({"name": "fred"})).post("users").await?;
//!
//!     // Inspect an error-classified response without raising.
//!     let response = client.ignore_errors(true).send("missing").await?;
//!     if response.is_error() {
//!         eprintln!("{}", response.notification());
//!     }
//!     # let _ = (users, created);
//!     Ok(())
//! }
//! ```

use crate::client::parser::ResponseParser;
use crate::client::request::{build_request, CallConfig, Endpoint};
use crate::client::response::RestResponse;
use crate::error::{RestError, Result};
use crate::format;
use crate::transport::{HttpTransport, Method, Transport};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Strategy producing the raised error for a classified failure.
///
/// Receives the notification string, the HTTP status code and the full
/// normalized response. The default builds [`RestError::Http`].
pub type ErrorMapper = Arc<dyn Fn(String, u16, RestResponse) -> RestError + Send + Sync>;

fn default_error_mapper() -> ErrorMapper {
    Arc::new(|notification, status, response| RestError::Http {
        notification,
        status,
        response: Box::new(response),
    })
}

/// Fluent REST client: accumulates call configuration, executes through a
/// [`Transport`], and normalizes responses.
#[derive(Clone)]
pub struct RestClient {
    endpoint: Endpoint,
    meta_header: String,
    transport: Arc<dyn Transport>,
    error_mapper: ErrorMapper,
    config: CallConfig,
}

impl RestClient {
    /// Create a client for a base service URL over the default
    /// [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// [`RestError::Config`] when the URL is empty or not syntactically
    /// valid. Configuration errors fail fast, before any network activity.
    pub fn new(service_url: &str) -> Result<Self> {
        Self::with_transport(service_url, Arc::new(HttpTransport::new()))
    }

    /// Create a client over a custom transport collaborator.
    pub fn with_transport(service_url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        if service_url.trim().is_empty() {
            return Err(RestError::Config(
                "the service URL was not specified".to_string(),
            ));
        }
        Url::parse(service_url)
            .map_err(|e| RestError::Config(format!("invalid service URL {service_url:?}: {e}")))?;
        Ok(RestClient {
            endpoint: Endpoint {
                url: service_url.to_string(),
                token: None,
                auth_header: "X-Auth-Token".to_string(),
                credentials: None,
            },
            meta_header: "X-Auth-Meta".to_string(),
            transport,
            error_mapper: default_error_mapper(),
            config: CallConfig::default(),
        })
    }

    /// Set the access token injected on every call.
    ///
    /// # Errors
    ///
    /// [`RestError::Config`] when the token is empty.
    pub fn with_token(mut self, token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(RestError::Config(
                "the auth token was not specified".to_string(),
            ));
        }
        self.endpoint.token = Some(token.to_string());
        Ok(self)
    }

    /// Override the header name carrying the access token
    /// (default `X-Auth-Token`).
    pub fn with_auth_header(mut self, name: &str) -> Self {
        self.endpoint.auth_header = name.to_string();
        self
    }

    /// Override the metadata header name (default `X-Auth-Meta`).
    pub fn with_meta_header(mut self, name: &str) -> Self {
        self.meta_header = name.to_string();
        self
    }

    /// Set HTTP Basic credentials.
    ///
    /// # Errors
    ///
    /// [`RestError::Config`] when either value is empty.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Result<Self> {
        if username.is_empty() || password.is_empty() {
            return Err(RestError::Config(
                "basic-auth credentials must not be empty".to_string(),
            ));
        }
        self.endpoint.credentials = Some((username.to_string(), password.to_string()));
        Ok(self)
    }

    /// Replace the strategy that produces the raised error for classified
    /// failures.
    pub fn with_error_mapper(mut self, mapper: ErrorMapper) -> Self {
        self.error_mapper = mapper;
        self
    }

    /// Set the HTTP method by name; unknown names map to GET.
    pub fn method(&mut self, name: &str) -> &mut Self {
        self.config.method = Method::from_name(name);
        self
    }

    /// Set the call payload.
    pub fn data(&mut self, data: Value) -> &mut Self {
        self.config.data = data;
        self
    }

    /// Add a header to the call.
    pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
        if let Some(entry) = self.config.headers.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_string();
        } else {
            self.config
                .headers
                .push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Add several headers to the call.
    pub fn headers<'a>(&mut self, headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> &mut Self {
        for (name, value) in headers {
            self.header(name, value);
        }
        self
    }

    /// Set both the accept and content-type formats to one name.
    /// Unrecognized names fall back to `json`.
    pub fn format(&mut self, name: &str) -> &mut Self {
        self.accept(name).content_type(name)
    }

    /// Set the accept format governing response decoding.
    pub fn accept(&mut self, name: &str) -> &mut Self {
        self.config.accept = format::resolve(name).name;
        self
    }

    /// Set the content-type format governing body encoding.
    pub fn content_type(&mut self, name: &str) -> &mut Self {
        self.config.content_type = format::resolve(name).name;
        self
    }

    /// Set the API version announced in the `X-Api-Version` header.
    pub fn version(&mut self, version: &str) -> &mut Self {
        self.config.version = version.to_string();
        self
    }

    /// Toggle the transport's diagnostic echo mode.
    pub fn verbose(&mut self, verbose: bool) -> &mut Self {
        self.config.verbose = verbose;
        self
    }

    /// Return error-classified responses to the caller instead of raising.
    pub fn ignore_errors(&mut self, ignore: bool) -> &mut Self {
        self.config.ignore_errors = ignore;
        self
    }

    /// GET an entity and return its decoded body.
    pub async fn get(&mut self, entity: &str) -> Result<Value> {
        self.method("GET").send_request(entity).await
    }

    /// POST the configured payload to an entity and return the decoded body.
    pub async fn post(&mut self, entity: &str) -> Result<Value> {
        self.method("POST").send_request(entity).await
    }

    /// PUT the configured payload to an entity and return the decoded body.
    pub async fn put(&mut self, entity: &str) -> Result<Value> {
        self.method("PUT").send_request(entity).await
    }

    /// DELETE an entity and return the decoded body.
    pub async fn delete(&mut self, entity: &str) -> Result<Value> {
        self.method("DELETE").send_request(entity).await
    }

    /// Execute the configured call and return the decoded body.
    ///
    /// Configuration is reset to defaults afterwards, raised or not.
    pub async fn send_request(&mut self, entity: &str) -> Result<Value> {
        self.send(entity).await.map(|response| response.body)
    }

    /// Execute the configured call and return the full normalized response.
    ///
    /// With `ignore_errors(true)` an error-classified response is returned
    /// instead of raised, its error flag still computable via
    /// [`RestResponse::is_error`].
    pub async fn send(&mut self, entity: &str) -> Result<RestResponse> {
        let result = self.dispatch(entity).await;
        self.reset();
        result
    }

    /// Execute the configured call with errors ignored and return the
    /// rendered trace of the outgoing header block. Useful as a test
    /// fixture; does not require the exchange to succeed.
    pub async fn send_raw(&mut self, entity: &str) -> String {
        let request = build_request(entity, &self.config, &self.endpoint);
        let outcome = self.transport.execute(&request).await;
        self.reset();
        outcome.sent_headers
    }

    /// Reset the per-call configuration to its just-constructed defaults.
    pub fn reset(&mut self) -> &mut Self {
        self.config = CallConfig::default();
        self
    }

    /// The current per-call configuration.
    pub fn config(&self) -> &CallConfig {
        &self.config
    }

    async fn dispatch(&mut self, entity: &str) -> Result<RestResponse> {
        let request = build_request(entity, &self.config, &self.endpoint);
        tracing::debug!(url = %request.url, method = %request.method, "dispatching request");

        let outcome = self.transport.execute(&request).await;
        let parser = ResponseParser::new(self.meta_header.clone());
        let response = parser.parse(
            &outcome.raw,
            outcome.status,
            &outcome.error,
            outcome.error_code,
            self.config.accept,
        )?;

        if !self.config.ignore_errors && response.is_error() {
            tracing::warn!(status = response.status, "request classified as error");
            let notification = response.notification();
            let status = response.http_status_code();
            return Err((self.error_mapper)(notification, status, response));
        }
        Ok(response)
    }
}
