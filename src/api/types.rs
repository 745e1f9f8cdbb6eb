//! Wire types for the backend HTTP contract and the normalized chat outcome

use super::ApiError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One result record: column name to scalar value, in backend order
pub type ResultRow = Map<String, Value>;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Success body of `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub response: String,
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<ResultRow>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Accept `null` where a string is expected
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Outcome of one chat call, with transport, protocol and application
/// failures folded into the same shape
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResponse {
    Success {
        text: String,
        generated_query: Option<String>,
        result_rows: Option<Vec<ResultRow>>,
    },
    Failure {
        error_message: String,
        /// Response text the backend sent alongside an application error
        partial_text: Option<String>,
        /// Query the backend ran before reporting an application error
        generated_query: Option<String>,
    },
}

impl NormalizedResponse {
    pub fn failure(error_message: impl Into<String>) -> Self {
        NormalizedResponse::Failure {
            error_message: error_message.into(),
            partial_text: None,
            generated_query: None,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_success(&self) -> bool {
        matches!(self, NormalizedResponse::Success { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            NormalizedResponse::Success { .. } => None,
            NormalizedResponse::Failure { error_message, .. } => Some(error_message),
        }
    }
}

impl From<ChatResponse> for NormalizedResponse {
    fn from(resp: ChatResponse) -> Self {
        match resp.error.filter(|e| !e.trim().is_empty()) {
            Some(error) => NormalizedResponse::Failure {
                error_message: ApiError::application(error).message,
                partial_text: Some(resp.response).filter(|t| !t.is_empty()),
                generated_query: resp.sql.filter(|q| !q.trim().is_empty()),
            },
            None => NormalizedResponse::Success {
                text: resp.response,
                generated_query: resp.sql,
                result_rows: resp.results,
            },
        }
    }
}

impl From<Result<ChatResponse, ApiError>> for NormalizedResponse {
    fn from(result: Result<ChatResponse, ApiError>) -> Self {
        match result {
            Ok(resp) => resp.into(),
            Err(e) => NormalizedResponse::failure(e.message),
        }
    }
}

/// Database engine behind a data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Postgres,
    Mysql,
    Sqlite,
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataSourceKind::Postgres => "postgres",
            DataSourceKind::Mysql => "mysql",
            DataSourceKind::Sqlite => "sqlite",
        })
    }
}

/// Connection state reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Error,
}

impl ConnectionStatus {
    pub fn badge(self) -> Badge {
        match self {
            ConnectionStatus::Connected => Badge::Positive,
            ConnectionStatus::Disconnected => Badge::Neutral,
            ConnectionStatus::Error => Badge::Negative,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Error => "error",
        })
    }
}

/// Fixed display treatment for a connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Positive,
    Neutral,
    Negative,
}

impl Badge {
    pub fn marker(self) -> &'static str {
        match self {
            Badge::Positive => "[+]",
            Badge::Neutral => "[ ]",
            Badge::Negative => "[!]",
        }
    }
}

/// Data source as listed by `GET /api/datasources`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub status: ConnectionStatus,
}

/// Partial descriptor sent to `POST /api/datasources/test`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataSourceProbe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<DataSourceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl From<&DataSource> for DataSourceProbe {
    fn from(source: &DataSource) -> Self {
        Self {
            id: Some(source.id.clone()),
            name: Some(source.name.clone()),
            kind: Some(source.kind),
            host: Some(source.host.clone()),
            port: Some(source.port),
            database: Some(source.database.clone()),
        }
    }
}

/// Body of the `POST /api/datasources/test` response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionTest {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl From<ApiError> for ConnectionTest {
    fn from(e: ApiError) -> Self {
        Self {
            success: false,
            message: e.message,
        }
    }
}
