//! HTTP implementation of the backend contract

use super::types::{ChatRequest, ChatResponse, ConnectionTest, DataSource, DataSourceProbe};
use super::{ApiError, Backend};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Backend reached over HTTP at the configured base URL
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{endpoint}", self.base_url))
            .header("content-type", "application/json")
    }

    /// Send a request and decode a success body, normalizing every failure
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::transport(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                ApiError::transport(format!("Connection failed: {e}"))
            } else {
                ApiError::transport(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::protocol(format!("Failed to parse response: {e}"))
                .with_status(status.as_u16())
        })
    }
}

/// Error body shapes the backend may send with a non-success status
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        let detail = match self.detail {
            Some(serde_json::Value::String(detail)) => Some(detail),
            _ => None,
        };
        self.message
            .filter(|m| !m.trim().is_empty())
            .or_else(|| detail.filter(|d| !d.trim().is_empty()))
    }
}

/// Pick the most readable message for a non-success response
fn classify_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| status.to_string());
    ApiError::protocol(message).with_status(status.as_u16())
}

#[async_trait]
impl Backend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.execute(self.request(Method::POST, "/api/chat").json(request))
            .await
    }

    async fn data_sources(&self) -> Result<Vec<DataSource>, ApiError> {
        self.execute(self.request(Method::GET, "/api/datasources"))
            .await
    }

    async fn test_connection(&self, probe: &DataSourceProbe) -> Result<ConnectionTest, ApiError> {
        self.execute(self.request(Method::POST, "/api/datasources/test").json(probe))
            .await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
