//! Backend error types

use thiserror::Error;

/// Backend call failure, normalized to a single human-readable message
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            // An empty message would render as a silent failure
            message: if message.trim().is_empty() {
                kind.fallback_message().to_string()
            } else {
                message
            },
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Protocol, message)
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Application, message)
    }
}

/// Where in the request a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No response: DNS, connect, reset, timeout
    Transport,
    /// Non-success status, or a success body that could not be decoded
    Protocol,
    /// Success status with an `error` field in the body
    Application,
}

impl ApiErrorKind {
    fn fallback_message(self) -> &'static str {
        match self {
            Self::Transport => "Request failed before a response was received",
            Self::Protocol => "Backend returned an invalid response",
            Self::Application => "Backend reported an error",
        }
    }
}
