//! Where todo lists come from.
//!
//! The reducer only sees the [`TodoSource`] trait. Production code uses
//! [`HttpTodoSource`]; tests and offline runs use the sources in
//! [`crate::mocks`].

use crate::config::TodoConfig;
use crate::types::TodoItem;
use futures::future::BoxFuture;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use todolist_runtime::retry::{retry_if, RetryPolicy};

/// Failure to fetch a list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The request never produced a response (connect, timeout, TLS)
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The server answered with a non-success status
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The body was not a JSON array of todo items
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The HTTP client could not be built
    #[error("client setup failed: {0}")]
    Client(String),
}

impl SourceError {
    /// Whether another attempt could succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) | Self::Client(_) => false,
        }
    }
}

/// Fetches the full remote list
///
/// Implementations return an owned future so it can run as an effect after
/// the reducer returns.
pub trait TodoSource: Send + Sync {
    /// Fetch every item the source has, in source order
    fn fetch_todos(&self) -> BoxFuture<'static, Result<Vec<TodoItem>, SourceError>>;
}

/// `GET <url>` returning a JSON array of todo items
#[derive(Clone, Debug)]
pub struct HttpTodoSource {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl HttpTodoSource {
    /// Creates a source with a single attempt per fetch
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Client`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            retry: RetryPolicy::once(),
        })
    }

    /// Creates a source from configuration
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &TodoConfig) -> Result<Self, SourceError> {
        Ok(Self::new(config.source_url.clone(), config.request_timeout())?
            .with_retry(RetryPolicy::attempts(config.fetch_attempts)))
    }

    /// Retry transient failures according to `policy`
    #[must_use]
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Endpoint this source reads
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_once(client: Client, url: String) -> Result<Vec<TodoItem>, SourceError> {
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

impl TodoSource for HttpTodoSource {
    fn fetch_todos(&self) -> BoxFuture<'static, Result<Vec<TodoItem>, SourceError>> {
        let client = self.client.clone();
        let url = self.url.clone();
        let retry = self.retry.clone();

        Box::pin(async move {
            tracing::debug!(url = %url, "Fetching todos");
            let items = retry_if(
                &retry,
                || Self::fetch_once(client.clone(), url.clone()),
                SourceError::is_transient,
            )
            .await?;
            tracing::debug!(url = %url, count = items.len(), "Fetched todos");
            Ok(items)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(SourceError::RequestFailed("reset".into()).is_transient());
        assert!(SourceError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(SourceError::Status {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!SourceError::Status {
            status: 404,
            body: String::new()
        }
        .is_transient());
        assert!(!SourceError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_from_config_uses_attempts() {
        let config = TodoConfig {
            fetch_attempts: 4,
            ..TodoConfig::default()
        };
        let source = HttpTodoSource::from_config(&config).unwrap();

        assert_eq!(source.url(), config.source_url);
        assert_eq!(source.retry.max_attempts(), 4);
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "unexpected status 500: boom");
    }
}
