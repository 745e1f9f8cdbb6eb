//! Pure state transition function

use super::turn::TurnDraft;
use super::{ConvState, Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is rejected; a rejected event leaves the state untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Still waiting for the previous response")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("No request is in flight")]
    NoRequestInFlight,
}

/// Pure transition function: no I/O, same inputs give the same outputs
pub fn transition(state: &ConvState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        (ConvState::Idle, Event::UserSubmit { text }) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }

            Ok(TransitionResult::new(ConvState::AwaitingResponse {
                message: text.to_string(),
            })
            .with_effect(Effect::append(TurnDraft::user(text)))
            .with_effect(Effect::ClearInput)
            .with_effect(Effect::NotifyState { awaiting: true })
            .with_effect(Effect::SendMessage {
                text: text.to_string(),
            }))
        }

        (ConvState::AwaitingResponse { .. }, Event::UserSubmit { .. }) => Err(TransitionError::Busy),

        (ConvState::AwaitingResponse { .. }, Event::ResponseReceived { response }) => {
            Ok(TransitionResult::new(ConvState::Idle)
                .with_effect(Effect::append(TurnDraft::assistant(response)))
                .with_effect(Effect::NotifyState { awaiting: false }))
        }

        // A completion with nothing outstanding would add a second reply
        (ConvState::Idle, Event::ResponseReceived { .. }) => {
            Err(TransitionError::NoRequestInFlight)
        }
    }
}
