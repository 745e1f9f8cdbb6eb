//! Property-based tests for the conversation state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_message() -> impl Strategy<Value = String> {
    "[ \t]{0,3}[a-zA-Z0-9?]{1,20}[ \t]{0,3}"
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n\r]{0,8}"
}

fn arb_response() -> impl Strategy<Value = NormalizedResponse> {
    prop_oneof![
        ("[a-zA-Z ]{0,30}", proptest::option::of("SELECT [a-z]{1,8}")).prop_map(
            |(text, generated_query)| NormalizedResponse::Success {
                text,
                generated_query,
                result_rows: None,
            }
        ),
        (
            "[a-zA-Z ]{1,30}",
            proptest::option::of("[a-z ]{1,20}"),
            proptest::option::of("SELECT [a-z]{1,8}")
        )
            .prop_map(|(error_message, partial_text, generated_query)| {
                NormalizedResponse::Failure {
                    error_message,
                    partial_text,
                    generated_query,
                }
            }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        prop_oneof![arb_message(), arb_blank()].prop_map(|text| Event::UserSubmit { text }),
        arb_response().prop_map(|response| Event::ResponseReceived { response }),
    ]
}

fn drive(conv: &mut Conversation, event: Event) -> Result<Applied, TransitionError> {
    match event {
        Event::UserSubmit { text } => conv.append_user_turn(&text),
        Event::ResponseReceived { response } => conv.append_assistant_turn(response),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn submit_once_then_reply_yields_two_turns(text in arb_message(), response in arb_response()) {
        let mut conv = Conversation::new();
        conv.append_user_turn(&text).unwrap();
        conv.append_assistant_turn(response).unwrap();

        prop_assert_eq!(conv.turns().len(), 2);
        prop_assert_eq!(conv.turns()[0].role, Role::User);
        prop_assert_eq!(&conv.turns()[0].text, text.trim());
        prop_assert_eq!(conv.turns()[1].role, Role::Assistant);
        prop_assert!(!conv.is_awaiting());
    }

    #[test]
    fn blank_input_never_changes_state(text in arb_blank()) {
        let mut conv = Conversation::new();
        let result = conv.append_user_turn(&text);

        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyMessage);
        prop_assert!(conv.turns().is_empty());
        prop_assert!(!conv.is_awaiting());
    }

    #[test]
    fn submit_while_awaiting_is_noop(first in arb_message(), second in arb_message()) {
        let mut conv = Conversation::new();
        conv.append_user_turn(&first).unwrap();
        let before = conv.turns().to_vec();

        prop_assert_eq!(conv.append_user_turn(&second).unwrap_err(), TransitionError::Busy);
        prop_assert_eq!(conv.turns(), before.as_slice());
        prop_assert!(conv.is_awaiting());
    }

    #[test]
    fn failure_turns_never_carry_query_results(message in "[a-zA-Z ]{1,30}") {
        let mut conv = Conversation::new();
        conv.append_user_turn("question").unwrap();
        conv.append_assistant_turn(NormalizedResponse::failure(message.clone())).unwrap();

        let reply = &conv.turns()[1];
        prop_assert_eq!(reply.error_message.as_deref(), Some(message.as_str()));
        prop_assert!(reply.generated_query.is_none());
        prop_assert!(reply.result_rows.is_none());
    }

    /// Any event sequence keeps user and assistant turns strictly alternating,
    /// with one SendMessage per accepted user turn.
    #[test]
    fn turns_alternate_under_any_event_sequence(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut conv = Conversation::new();
        let mut requests = 0usize;

        for event in events {
            let was_awaiting = conv.is_awaiting();
            let len_before = conv.turns().len();

            match drive(&mut conv, event) {
                Ok(applied) => {
                    prop_assert_eq!(applied.appended.len(), 1);
                    prop_assert_eq!(conv.turns().len(), len_before + 1);
                    prop_assert_ne!(was_awaiting, conv.is_awaiting());
                    requests += applied
                        .effects
                        .iter()
                        .filter(|e| matches!(e, Effect::SendMessage { .. }))
                        .count();
                }
                Err(_) => {
                    prop_assert_eq!(conv.turns().len(), len_before);
                    prop_assert_eq!(was_awaiting, conv.is_awaiting());
                }
            }
        }

        for (i, turn) in conv.turns().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            prop_assert_eq!(turn.role, expected);
        }

        let user_turns = conv.turns().iter().filter(|t| t.role == Role::User).count();
        prop_assert_eq!(requests, user_turns);
        prop_assert_eq!(conv.is_awaiting(), conv.turns().len() % 2 == 1);
    }

    #[test]
    fn transition_is_deterministic(event in arb_event(), awaiting in any::<bool>()) {
        let state = if awaiting {
            ConvState::AwaitingResponse { message: "pending".to_string() }
        } else {
            ConvState::Idle
        };

        let a = transition(&state, event.clone());
        let b = transition(&state, event);
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.new_state, b.new_state);
                prop_assert_eq!(a.effects.len(), b.effects.len());
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "transition outcome differed between calls"),
        }
    }
}
