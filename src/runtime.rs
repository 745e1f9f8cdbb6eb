//! Runtime for driving a conversation against a backend
//!
//! One [`ConversationRuntime`] task owns one [`Conversation`]. Front ends talk
//! to it through a [`SessionHandle`] and observe it through [`SessionEvent`]s.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;

use crate::api::{Backend, QueryClient};
use crate::conversation::{Conversation, ConversationTurn, Event};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

const EVENT_CHANNEL_CAPACITY: usize = 32;
const BROADCAST_CAPACITY: usize = 128;

/// Events sent to observers of a conversation
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Turns present when the runtime started
    Init { turns: Vec<ConversationTurn> },
    TurnAppended { turn: ConversationTurn },
    StateChange { awaiting: bool },
    /// A submission was refused; the conversation is unchanged
    Rejected { reason: String },
}

#[derive(Debug, Error)]
#[error("Conversation runtime has stopped")]
pub struct SessionClosed;

/// Handle to interact with a running conversation
#[derive(Clone)]
pub struct SessionHandle {
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Queue a user submission; acceptance is reported through [`SessionEvent`]s
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.event_tx
            .send(Event::UserSubmit { text: text.into() })
            .await
            .map_err(|_| SessionClosed)
    }

    #[allow(dead_code)] // Additional observers beyond the one returned at spawn
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }
}

/// Start a runtime task for `conversation`
///
/// The returned receiver is subscribed before the task starts, so it sees the
/// `Init` event. Once every handle is dropped the runtime answers whatever it
/// already accepted and then closes the event stream.
pub fn spawn_session<B>(
    client: Arc<QueryClient<B>>,
    conversation: Conversation,
) -> (SessionHandle, broadcast::Receiver<SessionEvent>)
where
    B: Backend + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (broadcast_tx, broadcast_rx) = broadcast::channel(BROADCAST_CAPACITY);

    let runtime = ConversationRuntime::new(conversation, client, event_rx, broadcast_tx.clone());
    tokio::spawn(runtime.run());

    (
        SessionHandle {
            event_tx,
            broadcast_tx,
        },
        broadcast_rx,
    )
}
