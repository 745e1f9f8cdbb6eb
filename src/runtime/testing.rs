//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a real backend.

use super::{spawn_session, SessionEvent, SessionHandle};
use crate::api::{
    ApiError, Backend, ChatRequest, ChatResponse, ConnectionTest, DataSource, DataSourceProbe,
    QueryClient,
};
use crate::config::ClientConfig;
use crate::conversation::{Conversation, ConversationTurn};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

// ============================================================================
// Mock Backend
// ============================================================================

/// Mock backend that returns queued responses
#[allow(dead_code)]
pub struct MockBackend {
    chats: Mutex<VecDeque<Result<ChatResponse, ApiError>>>,
    sources: Mutex<VecDeque<Result<Vec<DataSource>, ApiError>>>,
    connection_tests: Mutex<VecDeque<Result<ConnectionTest, ApiError>>>,
    /// Record of all chat requests made
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    /// Record of all connection probes made
    pub probes: Mutex<Vec<DataSourceProbe>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Self {
        Self {
            chats: Mutex::new(VecDeque::new()),
            sources: Mutex::new(VecDeque::new()),
            connection_tests: Mutex::new(VecDeque::new()),
            chat_requests: Mutex::new(Vec::new()),
            probes: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_chat(&self, response: Result<ChatResponse, ApiError>) {
        self.chats.lock().unwrap().push_back(response);
    }

    pub fn queue_sources(&self, response: Result<Vec<DataSource>, ApiError>) {
        self.sources.lock().unwrap().push_back(response);
    }

    pub fn queue_connection_test(&self, response: Result<ConnectionTest, ApiError>) {
        self.connection_tests.lock().unwrap().push_back(response);
    }

    pub fn recorded_chats(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn recorded_probes(&self) -> Vec<DataSourceProbe> {
        self.probes.lock().unwrap().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.chats
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::transport("No mock response queued")))
    }

    async fn data_sources(&self) -> Result<Vec<DataSource>, ApiError> {
        self.sources
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::transport("No mock response queued")))
    }

    async fn test_connection(&self, probe: &DataSourceProbe) -> Result<ConnectionTest, ApiError> {
        self.probes.lock().unwrap().push(probe.clone());
        self.connection_tests
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::transport("No mock response queued")))
    }

    fn base_url(&self) -> &str {
        "mock://backend"
    }
}

// ============================================================================
// Delayed Mock Backend (for in-flight testing)
// ============================================================================

/// Mock backend whose chat calls take a fixed time
pub struct DelayedMockBackend {
    inner: MockBackend,
    delay: Duration,
    /// Notified when a chat request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockBackend::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_chat(&self, response: Result<ChatResponse, ApiError>) {
        self.inner.queue_chat(response);
    }

    pub fn recorded_chats(&self) -> Vec<ChatRequest> {
        self.inner.recorded_chats()
    }
}

#[async_trait]
impl Backend for DelayedMockBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        // notify_one stores a permit, so a late waiter still wakes
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.chat(request).await
    }

    async fn data_sources(&self) -> Result<Vec<DataSource>, ApiError> {
        self.inner.data_sources().await
    }

    async fn test_connection(&self, probe: &DataSourceProbe) -> Result<ConnectionTest, ApiError> {
        self.inner.test_connection(probe).await
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}

// ============================================================================
// Test Session
// ============================================================================

/// Running session plus everything it has broadcast so far
pub struct TestSession {
    pub handle: SessionHandle,
    rx: broadcast::Receiver<SessionEvent>,
    events: Vec<SessionEvent>,
}

#[allow(dead_code)]
impl TestSession {
    pub fn start<B: Backend + 'static>(backend: B) -> Self {
        Self::start_with(backend, Conversation::new())
    }

    pub fn start_with<B: Backend + 'static>(backend: B, conversation: Conversation) -> Self {
        let client = Arc::new(QueryClient::new(backend, &ClientConfig::new("mock://backend")));
        let (handle, rx) = spawn_session(client, conversation);
        Self {
            handle,
            rx,
            events: Vec::new(),
        }
    }

    /// Pull everything already broadcast without waiting
    fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.events.push(event);
        }
    }

    pub fn events(&mut self) -> &[SessionEvent] {
        self.drain();
        &self.events
    }

    /// Turns in the order they were appended, excluding the initial ones
    pub fn turns(&mut self) -> Vec<ConversationTurn> {
        self.drain();
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::TurnAppended { turn } => Some(turn.clone()),
                _ => None,
            })
            .collect()
    }

    /// Last broadcast value of the awaiting flag
    pub fn awaiting(&mut self) -> bool {
        self.drain();
        self.events
            .iter()
            .rev()
            .find_map(|e| match e {
                SessionEvent::StateChange { awaiting } => Some(*awaiting),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Wait until at least `count` turns were appended, or the timeout passes
    pub async fn wait_for_turns(&mut self, count: usize, timeout: Duration) -> Vec<ConversationTurn> {
        let _ = tokio::time::timeout(timeout, async {
            while self.turns().len() < count {
                match self.rx.recv().await {
                    Ok(event) => self.events.push(event),
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
        .await;
        self.turns()
    }

    /// Wait for the next rejection reason
    pub async fn wait_for_rejection(&mut self, timeout: Duration) -> Option<String> {
        tokio::time::timeout(timeout, async {
            loop {
                match self.rx.recv().await {
                    Ok(SessionEvent::Rejected { reason }) => return Some(reason),
                    Ok(event) => self.events.push(event),
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .await
        .ok()
        .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[tokio::test]
    async fn test_mock_backend() {
        let mock = MockBackend::new();
        mock.queue_chat(Ok(ChatResponse {
            response: "Hello".to_string(),
            ..ChatResponse::default()
        }));

        let request = ChatRequest {
            message: "hi".to_string(),
            tenant_id: None,
        };

        let response = mock.chat(&request).await.unwrap();
        assert_eq!(response.response, "Hello");

        // Second call should fail (no more responses)
        assert!(mock.chat(&request).await.is_err());
        assert_eq!(mock.recorded_chats().len(), 2);
    }

    #[tokio::test]
    async fn test_session_reports_initial_turns() {
        let mut session =
            TestSession::start_with(MockBackend::new(), Conversation::with_greeting("Hello!"));

        let init = tokio::time::timeout(Duration::from_secs(5), session.rx.recv())
            .await
            .unwrap()
            .unwrap();
        match init {
            SessionEvent::Init { turns } => {
                assert_eq!(turns.len(), 1);
                assert_eq!(turns[0].role, Role::Assistant);
                assert_eq!(turns[0].text, "Hello!");
            }
            other => panic!("Expected Init, got {other:?}"),
        }
    }
}
