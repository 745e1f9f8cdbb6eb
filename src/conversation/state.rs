//! Conversation state types

use serde::Serialize;

/// Whether a backend request is outstanding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Ready for input
    #[default]
    Idle,
    /// One request in flight; further submissions are rejected
    AwaitingResponse {
        /// Message the request carries
        message: String,
    },
}

impl ConvState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, ConvState::AwaitingResponse { .. })
    }
}
