//! Query service: retried ask call plus answer formatting.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::backend::{AskClientBuilder, AskClientTrait, AskRequest, BackendError};
use crate::config::Config;
use crate::retry::{RetryFailure, RetryPolicy};

use super::formatter::format_answer;

/// Errors surfaced by [`QueryService::ask`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// Every attempt failed with a transport or status error.
    #[error("answer backend unavailable after {attempts} attempt(s): {source}")]
    BackendUnavailable {
        attempts: u32,
        #[source]
        source: BackendError,
    },

    /// The backend answered with a body that is not an answer.
    #[error("answer backend returned a malformed response: {0}")]
    MalformedResponse(#[source] BackendError),
}

impl From<RetryFailure<BackendError>> for QueryError {
    fn from(failure: RetryFailure<BackendError>) -> Self {
        match failure.error {
            error @ BackendError::MalformedResponse(_) => QueryError::MalformedResponse(error),
            error => QueryError::BackendUnavailable {
                attempts: failure.attempts,
                source: error,
            },
        }
    }
}

/// Sends queries to the answer backend and renders the replies.
///
/// Holds no mutable state; share it across threads behind an `Arc`.
pub struct QueryService {
    client: Arc<dyn AskClientTrait>,
    model: String,
    library_id: String,
    references_label: String,
    retry: RetryPolicy,
}

impl QueryService {
    /// Creates a service that talks through `client` with settings from `config`.
    #[must_use]
    pub fn new(client: Arc<dyn AskClientTrait>, config: &Config) -> Self {
        Self {
            client,
            model: config.model.clone(),
            library_id: config.library_id.clone(),
            references_label: config.references_label.clone(),
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a service backed by an HTTP [`crate::backend::AskClient`].
    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        let client = AskClientBuilder::new()
            .endpoint(&config.ask_endpoint)
            .api_key(&config.api_key)
            .build()?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Asks the backend and returns HTML ready for the chat.
    ///
    /// Transient failures are retried under the service's [`RetryPolicy`];
    /// a malformed body fails immediately.
    #[instrument(skip_all, fields(query_len = query.len()))]
    pub fn ask(&self, query: &str) -> Result<String, QueryError> {
        let request = AskRequest::new(query, &self.model, &self.library_id);

        let response = self
            .retry
            .run(|| self.client.ask(&request), BackendError::is_transient)?;

        info!(
            total_elapsed_ms = ?response.total_elapsed_ms,
            documents = response.documents.len(),
            "ask complete"
        );

        Ok(format_answer(&response, &self.references_label))
    }
}
