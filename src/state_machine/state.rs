//! Session state types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why a turn ended without an assistant reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Relay answered with a non-2xx status
    Relay,
    /// Could not reach the relay
    Network,
    /// Relay answered 2xx with a body we could not use
    Malformed,
    /// Configured request timeout elapsed
    Timeout,
    /// User cancelled the in-flight request
    Cancelled,
}

/// Request lifecycle status of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Ready for input, nothing in flight
    #[default]
    Idle,

    /// A relay request is in flight; further submits are rejected
    AwaitingResponse,

    /// Last turn failed. Recoverable: the next submit starts a new turn.
    Failed { reason: String, kind: FailureKind },
}

impl SessionStatus {
    /// True while the input control should be disabled
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionStatus::AwaitingResponse)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::AwaitingResponse => "awaiting_response",
            SessionStatus::Failed { .. } => "failed",
        }
    }
}

/// Full state owned by the session runtime, minus the transcript
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub status: SessionStatus,
    /// Current contents of the input box
    pub draft: String,
    /// Number of accepted submits. The in-flight request belongs to this turn.
    pub turn: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Immutable per-session configuration
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Model requested from the relay; `None` lets the relay pick its default
    pub model: Option<String>,
    /// Abort a relay call after this long. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self {
            model: std::env::var("PAIGE_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty()),
            request_timeout: std::env::var("PAIGE_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
