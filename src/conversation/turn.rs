//! Conversation turn types

use crate::api::{NormalizedResponse, ResultRow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Turn contents before an id and timestamp are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct TurnDraft {
    pub role: Role,
    pub text: String,
    pub generated_query: Option<String>,
    pub result_rows: Option<Vec<ResultRow>>,
    pub error_message: Option<String>,
}

impl TurnDraft {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            generated_query: None,
            result_rows: None,
            error_message: None,
        }
    }

    /// Plain assistant text with no query attached
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            ..Self::user(text)
        }
    }

    pub fn assistant(response: NormalizedResponse) -> Self {
        match response {
            NormalizedResponse::Success {
                text,
                generated_query,
                result_rows,
            } => Self {
                generated_query,
                result_rows,
                ..Self::assistant_text(text)
            },
            NormalizedResponse::Failure {
                error_message,
                partial_text,
                generated_query,
            } => Self {
                generated_query,
                error_message: Some(error_message),
                ..Self::assistant_text(partial_text.unwrap_or_default())
            },
        }
    }
}

/// One message in a conversation; never modified once appended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTurn {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_rows: Option<Vec<ResultRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ConversationTurn {
    pub(super) fn stamp(draft: TurnDraft) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: draft.role,
            text: draft.text,
            created_at: Utc::now(),
            generated_query: draft.generated_query,
            result_rows: draft.result_rows,
            error_message: draft.error_message,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// Column names for the result table, taken from the first row
    pub fn columns(&self) -> Vec<&str> {
        self.result_rows
            .as_ref()
            .and_then(|rows| rows.first())
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Cell text for every row, in `columns()` order
    pub fn table(&self) -> Vec<Vec<String>> {
        let columns = self.columns();
        self.result_rows
            .iter()
            .flatten()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| row.get(*col).map_or_else(String::new, display_value))
                    .collect()
            })
            .collect()
    }
}

/// Scalar cell text: strings unquoted, everything else as JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
