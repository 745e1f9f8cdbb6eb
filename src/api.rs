//! Remote query client
//!
//! Talks to the natural-language-to-SQL backend over its HTTP contract and
//! normalizes every outcome so callers never see a raw transport error.

mod error;
mod http;
mod types;

pub use error::ApiError;
pub use http::HttpBackend;
pub use types::*;

use crate::config::ClientConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for backend transports
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /api/chat`
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;

    /// `GET /api/datasources`
    async fn data_sources(&self) -> Result<Vec<DataSource>, ApiError>;

    /// `POST /api/datasources/test`
    async fn test_connection(&self, probe: &DataSourceProbe) -> Result<ConnectionTest, ApiError>;

    /// Base URL the backend is reached at
    fn base_url(&self) -> &str;
}

#[async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        (**self).chat(request).await
    }

    async fn data_sources(&self) -> Result<Vec<DataSource>, ApiError> {
        (**self).data_sources().await
    }

    async fn test_connection(&self, probe: &DataSourceProbe) -> Result<ConnectionTest, ApiError> {
        (**self).test_connection(probe).await
    }

    fn base_url(&self) -> &str {
        (**self).base_url()
    }
}

/// Logging wrapper for backends
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B: Backend> LoggingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    fn log_outcome<T>(&self, endpoint: &str, started: std::time::Instant, result: &Result<T, ApiError>) {
        let duration = started.elapsed();
        match result {
            Ok(_) => {
                tracing::info!(
                    base_url = %self.inner.base_url(),
                    endpoint,
                    duration_ms = %duration.as_millis(),
                    "Backend request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    base_url = %self.inner.base_url(),
                    endpoint,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Backend request failed"
                );
            }
        }
    }
}

#[async_trait]
impl<B: Backend> Backend for LoggingBackend<B> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let started = std::time::Instant::now();
        let result = self.inner.chat(request).await;
        self.log_outcome("/api/chat", started, &result);
        if let Ok(resp) = &result {
            tracing::debug!(
                has_sql = resp.sql.is_some(),
                rows = resp.results.as_ref().map_or(0, Vec::len),
                app_error = resp.error.is_some(),
                "Chat response received"
            );
        }
        result
    }

    async fn data_sources(&self) -> Result<Vec<DataSource>, ApiError> {
        let started = std::time::Instant::now();
        let result = self.inner.data_sources().await;
        self.log_outcome("/api/datasources", started, &result);
        result
    }

    async fn test_connection(&self, probe: &DataSourceProbe) -> Result<ConnectionTest, ApiError> {
        let started = std::time::Instant::now();
        let result = self.inner.test_connection(probe).await;
        self.log_outcome("/api/datasources/test", started, &result);
        result
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}

/// Normalizing facade over a backend
///
/// Every call resolves to a value the UI can show: chat outcomes become a
/// [`NormalizedResponse`], connection probes become a [`ConnectionTest`].
/// Nothing here retries.
pub struct QueryClient<B> {
    backend: B,
    tenant_id: Option<String>,
}

impl<B: Backend> QueryClient<B> {
    pub fn new(backend: B, config: &ClientConfig) -> Self {
        Self {
            backend,
            tenant_id: config.tenant_id.clone(),
        }
    }

    /// Send one message; only the latest message is sent, never history
    pub async fn send_message(&self, text: &str) -> NormalizedResponse {
        let request = ChatRequest {
            message: text.to_string(),
            tenant_id: self.tenant_id.clone(),
        };
        self.backend.chat(&request).await.into()
    }

    pub async fn get_data_sources(&self) -> Result<Vec<DataSource>, ApiError> {
        self.backend.data_sources().await
    }

    pub async fn test_connection(&self, probe: &DataSourceProbe) -> ConnectionTest {
        self.backend
            .test_connection(probe)
            .await
            .unwrap_or_else(ConnectionTest::from)
    }
}
