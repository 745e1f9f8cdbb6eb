//! Conversation state manager
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! [`Conversation`] owns the turn list and the awaiting flag and is the only
//! way to change either.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;
mod turn;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::ConvState;
pub use transition::{transition, TransitionError};
pub use turn::{ConversationTurn, Role, TurnDraft};

use crate::api::NormalizedResponse;

/// Turns appended and outward effects produced by one accepted operation
#[derive(Debug)]
pub struct Applied {
    pub appended: Vec<ConversationTurn>,
    /// Effects for the runtime to execute
    pub effects: Vec<Effect>,
}

/// Ordered turn sequence plus the awaiting flag
#[derive(Debug, Default)]
pub struct Conversation {
    state: ConvState,
    turns: Vec<ConversationTurn>,
    input: String,
}

impl Conversation {
    #[allow(dead_code)] // The terminal front end always starts with a greeting
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a single assistant greeting turn
    pub fn with_greeting(text: impl Into<String>) -> Self {
        Self {
            turns: vec![ConversationTurn::stamp(TurnDraft::assistant_text(text))],
            ..Self::default()
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    #[allow(dead_code)] // API completeness
    pub fn state(&self) -> &ConvState {
        &self.state
    }

    pub fn is_awaiting(&self) -> bool {
        self.state.is_awaiting()
    }

    /// Pending input buffer
    #[allow(dead_code)] // For front ends that keep an edit buffer
    pub fn input(&self) -> &str {
        &self.input
    }

    #[allow(dead_code)] // For front ends that keep an edit buffer
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Append a user turn and mark a request as outstanding
    pub fn append_user_turn(&mut self, text: &str) -> Result<Applied, TransitionError> {
        self.apply(Event::UserSubmit {
            text: text.to_string(),
        })
    }

    /// Append the single assistant turn answering the outstanding request
    pub fn append_assistant_turn(
        &mut self,
        response: NormalizedResponse,
    ) -> Result<Applied, TransitionError> {
        self.apply(Event::ResponseReceived { response })
    }

    fn apply(&mut self, event: Event) -> Result<Applied, TransitionError> {
        let result = transition(&self.state, event)?;
        self.state = result.new_state;

        let mut appended = Vec::new();
        let mut effects = Vec::new();
        for effect in result.effects {
            match effect {
                Effect::AppendTurn { draft } => {
                    let turn = ConversationTurn::stamp(draft);
                    self.turns.push(turn.clone());
                    appended.push(turn);
                }
                Effect::ClearInput => self.input.clear(),
                outward => effects.push(outward),
            }
        }

        Ok(Applied { appended, effects })
    }
}
