//! Session runtime executor

use super::traits::{RelayClient, RelayFailure};
use super::{Command, SessionEvent, SessionSnapshot};

use crate::message::{Message, MessageIdGen, RelayReply, RelayRequest, Role};
use crate::state_machine::{transition, Effect, Event, SessionConfig, SessionState};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

/// Owns one chat session: its state, its transcript and the in-flight call.
///
/// Only this task mutates the session. Events arrive over `command_rx`, are
/// run through [`transition`], and the resulting effects are executed here.
pub struct SessionRuntime<R: RelayClient + 'static> {
    config: SessionConfig,
    state: SessionState,
    transcript: Vec<Message>,
    ids: MessageIdGen,
    relay: Arc<R>,
    command_rx: mpsc::Receiver<Command>,
    /// Weak so the runtime stops once every handle is gone
    command_tx: mpsc::WeakSender<Command>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    /// Token to cancel the running relay request
    relay_cancel_token: Option<CancellationToken>,
}

impl<R: RelayClient + 'static> SessionRuntime<R> {
    pub fn new(
        config: SessionConfig,
        relay: R,
        command_rx: mpsc::Receiver<Command>,
        command_tx: &mpsc::Sender<Command>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            config,
            state: SessionState::new(),
            transcript: Vec::new(),
            ids: MessageIdGen::new(),
            relay: Arc::new(relay),
            command_rx,
            command_tx: command_tx.downgrade(),
            broadcast_tx,
            snapshot_tx,
            relay_cancel_token: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session = %self.ids.prefix(), "Starting session runtime");

        while let Some(command) = self.command_rx.recv().await {
            self.process_command(command);
        }

        if let Some(token) = self.relay_cancel_token.take() {
            token.cancel();
        }
        tracing::info!(session = %self.ids.prefix(), "Session runtime stopped");
    }

    fn process_command(&mut self, command: Command) {
        let Command { event, ack } = command;
        let accepted = self.process_event(event);
        if let Some(ack) = ack {
            let _ = ack.send(accepted);
        }
    }

    /// Returns false when the state machine rejected the event
    fn process_event(&mut self, event: Event) -> bool {
        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                // Rejections are silent no-ops for the caller
                tracing::debug!(
                    session = %self.ids.prefix(),
                    status = self.state.status.name(),
                    reason = %e,
                    "Event ignored"
                );
                return false;
            }
        };

        let old_state = std::mem::replace(&mut self.state, result.new_state);
        if old_state.status != self.state.status {
            tracing::debug!(
                session = %self.ids.prefix(),
                from = old_state.status.name(),
                to = self.state.status.name(),
                turn = self.state.turn,
                "Status change"
            );
            let _ = self.broadcast_tx.send(SessionEvent::StatusChange {
                status: self.state.status.clone(),
            });
        }

        for effect in result.effects {
            self.execute_effect(effect);
        }

        self.publish_snapshot();
        true
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage { role, content } => {
                let message = Message::new(self.ids.fresh(), role, content);
                self.transcript.push(message.clone());
                let _ = self.broadcast_tx.send(SessionEvent::Message { message });
            }

            Effect::RequestRelay { turn } => self.request_relay(turn),

            Effect::AbortRelay => {
                if let Some(token) = self.relay_cancel_token.take() {
                    tracing::info!(session = %self.ids.prefix(), turn = self.state.turn, "Aborting relay request");
                    token.cancel();
                }
            }

            Effect::ClearTranscript => {
                tracing::info!(
                    session = %self.ids.prefix(),
                    dropped = self.transcript.len(),
                    "Starting a new session"
                );
                self.transcript.clear();
            }

            Effect::NotifyTurnDone => {
                let _ = self.broadcast_tx.send(SessionEvent::TurnDone);
            }
        }
    }

    /// Spawn the relay call for `turn` as a background task. Its outcome comes
    /// back through the command channel tagged with the same turn.
    fn request_relay(&mut self, turn: u64) {
        let cancel_token = CancellationToken::new();
        if let Some(previous) = self.relay_cancel_token.replace(cancel_token.clone()) {
            previous.cancel();
        }

        let request = RelayRequest::from_history(&self.transcript, self.config.model.clone());
        let relay = self.relay.clone();
        let command_tx = self.command_tx.clone();
        let timeout = self.config.request_timeout;
        let session = self.ids.prefix().to_string();

        tokio::spawn(async move {
            tracing::info!(
                session = %session,
                turn,
                messages = request.messages.len(),
                "Sending relay request"
            );

            let call = async {
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, relay.send(&request))
                        .await
                        .unwrap_or_else(|_| Err(RelayFailure::timeout(limit))),
                    None => relay.send(&request).await,
                }
            };

            // Race the relay call against cancellation
            tokio::select! {
                biased;

                () = cancel_token.cancelled() => {
                    tracing::info!(session = %session, turn, "Relay request cancelled");
                }

                result = call => {
                    let event = relay_outcome(turn, result);
                    if let Event::RelayFailed { reason, kind, .. } = &event {
                        tracing::warn!(session = %session, turn, kind = ?kind, reason = %reason, "Relay request failed");
                    }
                    if let Some(tx) = command_tx.upgrade() {
                        let _ = tx.send(Command::from(event)).await;
                    }
                }
            }
        });
    }

    fn publish_snapshot(&self) {
        self.snapshot_tx.send_replace(SessionSnapshot {
            messages: self.transcript.clone(),
            status: self.state.status.clone(),
            draft: self.state.draft.clone(),
        });
    }
}

/// Map a finished relay call to the event that answers `turn`
fn relay_outcome(turn: u64, result: Result<RelayReply, RelayFailure>) -> Event {
    match result {
        Ok(reply) if reply.role == Role::Assistant => Event::RelayReply {
            turn,
            content: reply.content,
        },
        Ok(reply) => {
            let failure = RelayFailure::malformed(format!("Reply has role {}", reply.role));
            Event::RelayFailed {
                turn,
                reason: failure.message,
                kind: failure.kind,
            }
        }
        Err(failure) => Event::RelayFailed {
            turn,
            reason: failure.message,
            kind: failure.kind,
        },
    }
}

impl From<Event> for Command {
    fn from(event: Event) -> Self {
        Self { event, ack: None }
    }
}

impl Command {
    pub(crate) fn with_ack(event: Event) -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                event,
                ack: Some(tx),
            },
            rx,
        )
    }
}
