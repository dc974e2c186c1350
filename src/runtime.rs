//! Runtime for chat sessions
//!
//! A [`ChatSession`] is the handle the presentation layer holds. Every call
//! turns into an [`Event`] queued for the session's [`SessionRuntime`] task,
//! which is the only place session state changes.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use crate::message::Message;
use crate::state_machine::{Event, SessionConfig, SessionStatus};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Event queued for a session runtime. `ack` reports whether the state
/// machine accepted it.
#[derive(Debug)]
pub struct Command {
    event: Event,
    ack: Option<oneshot::Sender<bool>>,
}

/// Events sent to session observers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Message { message: Message },
    StatusChange { status: SessionStatus },
    TurnDone,
}

/// Immutable copy of what a session shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub status: SessionStatus,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session runtime has stopped")]
    Closed,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct ChatSession {
    command_tx: mpsc::Sender<Command>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl ChatSession {
    /// Start a session runtime on the current tokio runtime.
    ///
    /// The runtime task stops when the last handle is dropped.
    pub fn spawn<R: RelayClient + 'static>(relay: R, config: SessionConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());

        let runtime = SessionRuntime::new(
            config,
            relay,
            command_rx,
            &command_tx,
            broadcast_tx.clone(),
            snapshot_tx,
        );
        tokio::spawn(runtime.run());

        Self {
            command_tx,
            broadcast_tx,
            snapshot_rx,
        }
    }

    /// Queue `event` and wait until the runtime has processed it
    async fn dispatch(&self, event: Event) -> Result<bool, SessionError> {
        let (command, ack) = Command::with_ack(event);
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)?;
        ack.await.map_err(|_| SessionError::Closed)
    }

    /// Send `text` as the next user turn.
    ///
    /// Returns `Ok(false)` when the submit was a no-op: blank text, or a
    /// request already in flight.
    pub async fn submit(&self, text: impl Into<String>) -> Result<bool, SessionError> {
        self.dispatch(Event::submit(text)).await
    }

    pub async fn set_draft(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.dispatch(Event::draft(text)).await.map(|_| ())
    }

    /// Abort the in-flight request. `Ok(false)` if nothing was in flight.
    pub async fn cancel(&self) -> Result<bool, SessionError> {
        self.dispatch(Event::UserCancel).await
    }

    /// Drop the transcript and start over
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.dispatch(Event::Reset).await.map(|_| ())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Wait until no request is in flight and return the settled snapshot.
    ///
    /// With no request timeout configured this waits as long as the relay
    /// call does.
    pub async fn wait_until_settled(&self) -> Result<SessionSnapshot, SessionError> {
        let mut rx = self.snapshot_rx.clone();
        let snapshot = rx
            .wait_for(|s| !s.status.is_busy())
            .await
            .map_err(|_| SessionError::Closed)?
            .clone();
        Ok(snapshot)
    }
}
