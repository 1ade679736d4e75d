/// Ask endpoint HTTP client implementation.
///
/// This module provides `AskClient` for making synchronous requests to the
/// answer backend, along with its error type and builder.
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use super::types::{AnswerResponse, AskRequest};

/// Ask endpoint used when none is configured.
pub const DEFAULT_ASK_ENDPOINT: &str = "https://api.aiproxy.io/api/library/ask";

/// Per-attempt request timeout, covering connect, send and the whole body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Errors that can occur when calling the answer backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The body could not be decoded as an answer
    #[error("Malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// Invalid endpoint configuration
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    /// Returns `true` for failures worth another attempt.
    ///
    /// Every non-success status is transient here, 4xx included. Decoding and
    /// configuration errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Network(_) => true,
            BackendError::Timeout(_) => true,
            BackendError::Http { .. } => true,
            BackendError::MalformedResponse(_) => false,
            BackendError::InvalidUrl(_) => false,
        }
    }

    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            BackendError::Timeout(error)
        } else {
            BackendError::Network(error)
        }
    }
}

/// Builder for constructing `AskClient` instances.
///
/// # Examples
///
/// ```
/// use askrelay::backend::AskClientBuilder;
///
/// let client = AskClientBuilder::new()
///     .endpoint("http://localhost:8080/api/library/ask")
///     .api_key("secret")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.endpoint(), "http://localhost:8080/api/library/ask");
/// ```
#[derive(Debug, Default)]
pub struct AskClientBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl AskClientBuilder {
    /// Creates a new `AskClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full URL of the ask endpoint.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets the API key sent as a bearer credential.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `AskClient`.
    ///
    /// Falls back to [`DEFAULT_ASK_ENDPOINT`] and [`DEFAULT_REQUEST_TIMEOUT`]
    /// when those were not set. Returns `BackendError::InvalidUrl` if the
    /// endpoint does not parse.
    pub fn build(self) -> Result<AskClient, BackendError> {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ASK_ENDPOINT.to_string());

        reqwest::Url::parse(&endpoint)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .build()
            .map_err(BackendError::Network)?;

        Ok(AskClient {
            client,
            endpoint,
            api_key: self.api_key.unwrap_or_default(),
        })
    }
}

/// Synchronous HTTP client for the ask endpoint.
///
/// One call to [`AskClientTrait::ask`] is one HTTP attempt; retries belong to
/// the caller.
pub struct AskClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

/// Trait for answer backend operations.
///
/// This trait enables mocking in unit tests.
pub trait AskClientTrait: Send + Sync {
    /// Sends one ask request and decodes the answer.
    fn ask(&self, request: &AskRequest) -> Result<AnswerResponse, BackendError>;
}

impl AskClient {
    /// Returns the endpoint configured for this client.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn ask_internal(&self, request: &AskRequest) -> Result<AnswerResponse, BackendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(BackendError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(BackendError::from_transport)?;
        debug!(bytes = body.len(), "ask response received");

        serde_json::from_str(&body).map_err(BackendError::MalformedResponse)
    }
}

impl AskClientTrait for AskClient {
    fn ask(&self, request: &AskRequest) -> Result<AnswerResponse, BackendError> {
        self.ask_internal(request)
    }
}
