//! Effects produced by state transitions

use super::turn::TurnDraft;

/// Effects to be executed after a state transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Append a turn to the conversation
    AppendTurn { draft: TurnDraft },

    /// Clear the pending input buffer
    ClearInput,

    /// Issue the backend request for a user message
    SendMessage { text: String },

    /// Tell observers the awaiting flag changed
    NotifyState { awaiting: bool },
}

impl Effect {
    pub fn append(draft: TurnDraft) -> Self {
        Effect::AppendTurn { draft }
    }

    /// Effects applied to the conversation itself rather than handed to the runtime
    #[allow(dead_code)] // Used in tests
    pub fn is_local(&self) -> bool {
        matches!(self, Effect::AppendTurn { .. } | Effect::ClearInput)
    }
}
