//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::message::{RelayReply, RelayRequest, Role};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Semaphore;

// ============================================================================
// Mock Relay Client
// ============================================================================

/// Mock relay client that returns queued replies
#[derive(Default)]
pub struct MockRelayClient {
    responses: Mutex<VecDeque<Result<RelayReply, RelayFailure>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<RelayRequest>>,
}

impl MockRelayClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an assistant reply
    pub fn queue_reply(&self, content: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(RelayReply {
            role: Role::Assistant,
            content: content.into(),
            id: uuid::Uuid::new_v4().to_string(),
        }));
    }

    /// Queue a failure
    pub fn queue_failure(&self, failure: RelayFailure) {
        self.responses.lock().unwrap().push_back(Err(failure));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<RelayRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl RelayClient for MockRelayClient {
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, RelayFailure> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RelayFailure::network("No mock reply queued")))
    }
}

// ============================================================================
// Gated Relay Client
// ============================================================================

/// Relay client whose calls block until the test opens the gate.
///
/// Requests are recorded as soon as they arrive. A gate that is never opened
/// models a relay that never answers.
pub struct GatedRelayClient {
    pub inner: MockRelayClient,
    gate: Semaphore,
}

impl GatedRelayClient {
    pub fn new() -> Self {
        Self {
            inner: MockRelayClient::new(),
            gate: Semaphore::new(0),
        }
    }

    /// Let `n` pending or future calls through
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl RelayClient for GatedRelayClient {
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, RelayFailure> {
        self.inner.requests.lock().unwrap().push(request.clone());
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| RelayFailure::network("gate closed"))?;
        permit.forget();
        self.inner
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RelayFailure::network("No mock reply queued")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ChatSession, Command, SessionEvent};
    use crate::state_machine::{Event, FailureKind, SessionConfig, SessionStatus};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    fn spawn_mock() -> (Arc<MockRelayClient>, ChatSession) {
        let relay = Arc::new(MockRelayClient::new());
        let session = ChatSession::spawn(relay.clone(), SessionConfig::default());
        (relay, session)
    }

    fn spawn_gated(config: SessionConfig) -> (Arc<GatedRelayClient>, ChatSession) {
        let relay = Arc::new(GatedRelayClient::new());
        let session = ChatSession::spawn(relay.clone(), config);
        (relay, session)
    }

    fn transcript(session: &ChatSession) -> Vec<(Role, String)> {
        session
            .snapshot()
            .messages
            .into_iter()
            .map(|m| (m.role, m.content))
            .collect()
    }

    /// Wait until the gated relay has seen `n` calls
    async fn wait_for_calls(relay: &GatedRelayClient, n: usize) {
        for _ in 0..100 {
            if relay.inner.call_count() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("relay never saw {n} calls");
    }

    /// Round trip: user message then assistant reply, back to idle
    #[tokio::test]
    async fn test_simple_round_trip() {
        let (relay, session) = spawn_mock();
        relay.queue_reply("Hi there!");

        assert!(session.submit("Hello").await.unwrap());
        let settled = session.wait_until_settled().await.unwrap();

        assert_eq!(settled.status, SessionStatus::Idle);
        assert_eq!(
            transcript(&session),
            vec![
                (Role::User, "Hello".to_string()),
                (Role::Assistant, "Hi there!".to_string())
            ]
        );

        let requests = relay.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::User);
        assert_eq!(requests[0].messages[0].content, "Hello");
        assert_eq!(requests[0].model, None);
    }

    /// Blank input never reaches the relay
    #[tokio::test]
    async fn test_empty_submit_is_noop() {
        let (relay, session) = spawn_mock();

        for text in ["", "   ", "\n\t "] {
            assert!(!session.submit(text).await.unwrap());
        }

        let snapshot = session.snapshot();
        assert!(snapshot.messages.is_empty());
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert_eq!(relay.call_count(), 0);
    }

    /// A failed round trip keeps the user's message and is recoverable
    #[tokio::test]
    async fn test_failure_leaves_user_message() {
        let (relay, session) = spawn_mock();
        relay.queue_failure(RelayFailure::relay(500, "Failed to process request"));

        assert!(session.submit("Ping").await.unwrap());
        let settled = session.wait_until_settled().await.unwrap();

        assert!(matches!(
            settled.status,
            SessionStatus::Failed {
                kind: FailureKind::Relay,
                ..
            }
        ));
        assert_eq!(transcript(&session), vec![(Role::User, "Ping".to_string())]);

        // Retry from Failed starts a fresh turn with the full history
        relay.queue_reply("Pong");
        assert!(session.submit("Ping").await.unwrap());
        let settled = session.wait_until_settled().await.unwrap();

        assert_eq!(settled.status, SessionStatus::Idle);
        assert_eq!(settled.messages.len(), 3);
        assert_eq!(relay.recorded_requests()[1].messages.len(), 2);
    }

    /// A second submit while the first is in flight is dropped
    #[tokio::test]
    async fn test_submit_while_awaiting_is_rejected() {
        let (relay, session) = spawn_gated(SessionConfig::default());
        relay.inner.queue_reply("Reply to A");

        assert!(session.submit("A").await.unwrap());
        assert!(!session.submit("B").await.unwrap());
        assert!(session.snapshot().status.is_busy());

        relay.release(1);
        session.wait_until_settled().await.unwrap();

        assert_eq!(
            transcript(&session),
            vec![
                (Role::User, "A".to_string()),
                (Role::Assistant, "Reply to A".to_string())
            ]
        );
        assert_eq!(relay.inner.call_count(), 1);
    }

    /// History is sent in order on every turn
    #[tokio::test]
    async fn test_full_history_sent_each_turn() {
        let (relay, session) = spawn_mock();
        relay.queue_reply("one");
        relay.queue_reply("two");

        session.submit("first").await.unwrap();
        session.wait_until_settled().await.unwrap();
        session.submit("second").await.unwrap();
        session.wait_until_settled().await.unwrap();

        let second = &relay.recorded_requests()[1];
        let contents: Vec<&str> = second.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "one", "second"]);
    }

    #[tokio::test]
    async fn test_message_ids_are_unique() {
        let (relay, session) = spawn_mock();
        for i in 0..5 {
            relay.queue_reply(format!("reply {i}"));
            session.submit(format!("message {i}")).await.unwrap();
            session.wait_until_settled().await.unwrap();
        }

        let ids: HashSet<String> = session
            .snapshot()
            .messages
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn test_model_is_forwarded() {
        let relay = Arc::new(MockRelayClient::new());
        let session = ChatSession::spawn(
            relay.clone(),
            SessionConfig::default().with_model("gpt-4o"),
        );
        relay.queue_reply("ok");

        session.submit("hi").await.unwrap();
        session.wait_until_settled().await.unwrap();

        assert_eq!(relay.recorded_requests()[0].model.as_deref(), Some("gpt-4o"));
    }

    /// Cancel aborts the call; the unanswered message stays
    #[tokio::test]
    async fn test_cancel_during_relay_request() {
        let (relay, session) = spawn_gated(SessionConfig::default());
        relay.inner.queue_reply("should be discarded");

        session.submit("slow question").await.unwrap();
        wait_for_calls(&relay, 1).await;
        assert!(session.cancel().await.unwrap());

        let settled = session.wait_until_settled().await.unwrap();
        assert!(matches!(
            settled.status,
            SessionStatus::Failed {
                kind: FailureKind::Cancelled,
                ..
            }
        ));

        // Opening the gate later must not append anything
        relay.release(1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            transcript(&session),
            vec![(Role::User, "slow question".to_string())]
        );

        // Nothing left to cancel
        assert!(!session.cancel().await.unwrap());
    }

    /// A relay result tagged with an old turn is discarded
    #[tokio::test]
    async fn test_stale_relay_result_is_ignored() {
        let (relay, session) = spawn_gated(SessionConfig::default());
        session.submit("first").await.unwrap();

        let stale = Event::RelayReply {
            turn: 7,
            content: "late".to_string(),
        };
        let (command, ack) = Command::with_ack(stale);
        session.command_tx.send(command).await.unwrap();
        assert!(!ack.await.unwrap());

        let snapshot = session.snapshot();
        assert!(snapshot.status.is_busy());
        assert_eq!(snapshot.messages.len(), 1);
        relay.release(1);
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let (_relay, session) = spawn_gated(
            SessionConfig::default().with_request_timeout(Duration::from_millis(50)),
        );

        session.submit("anyone there?").await.unwrap();
        let settled = tokio::time::timeout(Duration::from_secs(2), session.wait_until_settled())
            .await
            .expect("timeout should settle the session")
            .unwrap();

        assert!(matches!(
            settled.status,
            SessionStatus::Failed {
                kind: FailureKind::Timeout,
                ..
            }
        ));
        assert_eq!(settled.messages.len(), 1);
    }

    /// Without a timeout a call that never resolves leaves the session waiting
    #[tokio::test]
    async fn test_unresolved_call_stays_awaiting() {
        let (_relay, session) = spawn_gated(SessionConfig::default());

        session.submit("hello?").await.unwrap();
        let waited =
            tokio::time::timeout(Duration::from_millis(100), session.wait_until_settled()).await;

        assert!(waited.is_err());
        assert_eq!(session.snapshot().status, SessionStatus::AwaitingResponse);
    }

    #[tokio::test]
    async fn test_reset_clears_transcript() {
        let (relay, session) = spawn_gated(SessionConfig::default());
        relay.inner.queue_reply("fresh reply");

        session.set_draft("typing").await.unwrap();
        session.submit("old").await.unwrap();
        session.reset().await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert!(snapshot.messages.is_empty());
        assert!(snapshot.draft.is_empty());

        // The new session works and the aborted call never lands
        relay.release(1);
        session.submit("new").await.unwrap();
        let settled = session.wait_until_settled().await.unwrap();
        assert_eq!(settled.messages.len(), 2);
        assert_eq!(settled.messages[0].content, "new");
        assert_eq!(settled.messages[1].content, "fresh reply");
    }

    #[tokio::test]
    async fn test_draft_survives_rejected_submit() {
        let (_relay, session) = spawn_gated(SessionConfig::default());
        session.submit("first").await.unwrap();
        session.set_draft("next question").await.unwrap();

        assert!(!session.submit("next question").await.unwrap());
        assert_eq!(session.snapshot().draft, "next question");
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let (relay, session) = spawn_mock();
        let mut events = session.subscribe();
        relay.queue_reply("Hi there!");

        session.submit("Hello").await.unwrap();
        session.wait_until_settled().await.unwrap();

        let mut messages = 0;
        let mut turn_done = false;
        let mut statuses = Vec::new();
        while let Ok(event) = events.try_recv() {
            match event {
                SessionEvent::Message { .. } => messages += 1,
                SessionEvent::StatusChange { status } => statuses.push(status),
                SessionEvent::TurnDone => turn_done = true,
            }
        }

        assert_eq!(messages, 2);
        assert!(turn_done);
        assert_eq!(
            statuses,
            vec![SessionStatus::AwaitingResponse, SessionStatus::Idle]
        );
    }

    /// Session, HTTP client, relay and provider mock wired together
    #[tokio::test]
    async fn test_end_to_end_through_http_relay() {
        use crate::api::{create_router, AppState};
        use crate::llm::testing::MockLlmService;
        use crate::llm::{LlmError, LlmResponse};
        use crate::relay::{RelayConfig, RelayService};

        let llm = Arc::new(MockLlmService::new());
        llm.queue_response(LlmResponse::text("Hi there!"));
        llm.queue_error(LlmError::rate_limit("slow down"));

        let relay = RelayService::new(llm.clone(), &RelayConfig::default());
        let app = create_router(AppState::new(Arc::new(relay)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let session = ChatSession::spawn(
            HttpRelayClient::new(&format!("http://{addr}")),
            SessionConfig::default().with_model("gpt-4o"),
        );

        session.submit("Hello").await.unwrap();
        let settled = session.wait_until_settled().await.unwrap();
        assert_eq!(settled.status, SessionStatus::Idle);
        assert_eq!(
            transcript(&session),
            vec![
                (Role::User, "Hello".to_string()),
                (Role::Assistant, "Hi there!".to_string())
            ]
        );
        assert_eq!(llm.recorded_requests()[0].model, "gpt-4o");

        // Provider failure surfaces as a relay failure, detail withheld
        session.submit("again").await.unwrap();
        let settled = session.wait_until_settled().await.unwrap();
        assert_eq!(
            settled.status,
            SessionStatus::Failed {
                reason: "HTTP 500: Failed to process request".to_string(),
                kind: FailureKind::Relay,
            }
        );
        assert_eq!(settled.messages.len(), 3);
        assert_eq!(llm.recorded_requests()[1].messages.len(), 3);
    }
}
