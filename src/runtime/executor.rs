//! Conversation runtime executor

use super::SessionEvent;
use crate::api::{Backend, NormalizedResponse, QueryClient};
use crate::conversation::{Applied, Conversation, Effect, Event, TransitionError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Owns a conversation and sequences its single outstanding request
pub struct ConversationRuntime<B>
where
    B: Backend + 'static,
{
    conversation: Conversation,
    client: Arc<QueryClient<B>>,
    event_rx: mpsc::Receiver<Event>,
    /// Backend request started by the last accepted submit
    in_flight: Option<JoinHandle<NormalizedResponse>>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl<B> ConversationRuntime<B>
where
    B: Backend + 'static,
{
    pub fn new(
        conversation: Conversation,
        client: Arc<QueryClient<B>>,
        event_rx: mpsc::Receiver<Event>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            conversation,
            client,
            event_rx,
            in_flight: None,
            broadcast_tx,
        }
    }

    /// Process events until every handle is dropped and the outstanding
    /// request, if any, has been answered
    pub async fn run(mut self) {
        tracing::info!(
            turns = self.conversation.turns().len(),
            "Starting conversation runtime"
        );
        let _ = self.broadcast_tx.send(SessionEvent::Init {
            turns: self.conversation.turns().to_vec(),
        });

        let mut handles_open = true;
        loop {
            let event = tokio::select! {
                received = self.event_rx.recv(), if handles_open => match received {
                    Some(event) => event,
                    None => {
                        tracing::debug!(
                            in_flight = self.in_flight.is_some(),
                            "All session handles dropped"
                        );
                        handles_open = false;
                        continue;
                    }
                },
                response = join_request(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.in_flight = None;
                    Event::ResponseReceived { response }
                }
                else => break,
            };

            if let Err(e) = self.process_event(event) {
                tracing::debug!(
                    error = %e,
                    awaiting = self.conversation.is_awaiting(),
                    "Event rejected"
                );
            }
        }

        tracing::info!(
            turns = self.conversation.turns().len(),
            "Conversation runtime stopped"
        );
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = match event {
            Event::UserSubmit { text } => self.conversation.append_user_turn(&text),
            Event::ResponseReceived { response } => {
                self.conversation.append_assistant_turn(response)
            }
        };

        let Applied { appended, effects } = match result {
            Ok(applied) => applied,
            Err(e) => {
                // Rejections are user-facing (e.g. "still waiting")
                let _ = self.broadcast_tx.send(SessionEvent::Rejected {
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        for turn in appended {
            let _ = self.broadcast_tx.send(SessionEvent::TurnAppended { turn });
        }
        for effect in effects {
            self.execute_effect(effect);
        }

        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SendMessage { text } => {
                // Run the request as a background task; run() turns its
                // result into a ResponseReceived event
                let client = self.client.clone();
                self.in_flight = Some(tokio::spawn(async move {
                    tracing::info!(chars = text.len(), "Sending chat message (background)");
                    let response = client.send_message(&text).await;
                    if let Some(error) = response.error_message() {
                        tracing::warn!(error = %error, "Chat request failed");
                    }
                    response
                }));
            }

            Effect::NotifyState { awaiting } => {
                let _ = self.broadcast_tx.send(SessionEvent::StateChange { awaiting });
            }

            // Applied by the conversation itself
            Effect::AppendTurn { .. } | Effect::ClearInput => {}
        }
    }
}

/// Wait for the outstanding request; pending forever when there is none
async fn join_request(in_flight: &mut Option<JoinHandle<NormalizedResponse>>) -> NormalizedResponse {
    match in_flight {
        Some(task) => task.await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Chat request task failed");
            NormalizedResponse::failure(format!("Request task failed: {e}"))
        }),
        None => std::future::pending().await,
    }
}
