//! Pure state transition function
//!
//! Given the same state and event this always produces the same result, with
//! no I/O. The runtime applies the effects.

use super::{Effect, Event, FailureKind, SessionState, SessionStatus};
use crate::message::has_content;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Rejected transitions. None of these change the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A request is already in flight")]
    SessionBusy,
    #[error("Nothing to send")]
    EmptyInput,
    #[error("Discarding relay result for turn {turn}")]
    StaleRelayResult { turn: u64 },
    #[error("No request in flight")]
    NothingToCancel,
}

/// Pure transition function
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (&state.status, event) {
        // ============================================================
        // Draft editing: allowed in every status
        // ============================================================
        (_, Event::DraftChanged { text }) => Ok(TransitionResult::new(SessionState {
            draft: text,
            ..state.clone()
        })),

        // ============================================================
        // Submit
        // ============================================================

        // Idle/Failed + UserSubmit -> AwaitingResponse (Failed is recovered here)
        (SessionStatus::Idle | SessionStatus::Failed { .. }, Event::UserSubmit { text }) => {
            if !has_content(&text) {
                return Err(TransitionError::EmptyInput);
            }
            let turn = state.turn + 1;
            Ok(TransitionResult::new(SessionState {
                status: SessionStatus::AwaitingResponse,
                draft: String::new(),
                turn,
            })
            .with_effect(Effect::append_user(text.trim()))
            .with_effect(Effect::RequestRelay { turn }))
        }

        // In-flight guard
        (SessionStatus::AwaitingResponse, Event::UserSubmit { .. }) => {
            Err(TransitionError::SessionBusy)
        }

        // ============================================================
        // Relay results
        // ============================================================
        (SessionStatus::AwaitingResponse, Event::RelayReply { turn, content })
            if turn == state.turn =>
        {
            if !has_content(&content) {
                return Ok(TransitionResult::new(SessionState {
                    status: SessionStatus::Failed {
                        reason: "Relay returned an empty reply".to_string(),
                        kind: FailureKind::Malformed,
                    },
                    ..state.clone()
                }));
            }
            Ok(TransitionResult::new(SessionState {
                status: SessionStatus::Idle,
                ..state.clone()
            })
            .with_effect(Effect::append_assistant(content))
            .with_effect(Effect::NotifyTurnDone))
        }

        // Failure keeps the user's message; nothing is rolled back
        (SessionStatus::AwaitingResponse, Event::RelayFailed { turn, reason, kind })
            if turn == state.turn =>
        {
            Ok(TransitionResult::new(SessionState {
                status: SessionStatus::Failed { reason, kind },
                ..state.clone()
            }))
        }

        // Late results for a cancelled, reset or superseded turn
        (_, Event::RelayReply { turn, .. } | Event::RelayFailed { turn, .. }) => {
            Err(TransitionError::StaleRelayResult { turn })
        }

        // ============================================================
        // Cancellation
        // ============================================================
        (SessionStatus::AwaitingResponse, Event::UserCancel) => {
            Ok(TransitionResult::new(SessionState {
                status: SessionStatus::Failed {
                    reason: "Cancelled by user".to_string(),
                    kind: FailureKind::Cancelled,
                },
                ..state.clone()
            })
            .with_effect(Effect::AbortRelay))
        }

        (_, Event::UserCancel) => Err(TransitionError::NothingToCancel),

        // ============================================================
        // Reset: the only way the transcript shrinks
        // ============================================================
        (status, Event::Reset) => {
            let result = TransitionResult::new(SessionState {
                status: SessionStatus::Idle,
                draft: String::new(),
                turn: state.turn,
            });
            let result = if status.is_busy() {
                result.with_effect(Effect::AbortRelay)
            } else {
                result
            };
            Ok(result.with_effect(Effect::ClearTranscript))
        }
    }
}
