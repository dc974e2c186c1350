//! Events that can occur in a session

use super::state::FailureKind;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    UserSubmit {
        text: String,
    },
    DraftChanged {
        text: String,
    },
    UserCancel,
    Reset,

    // Relay events, tagged with the turn they answer
    RelayReply {
        turn: u64,
        content: String,
    },
    RelayFailed {
        turn: u64,
        reason: String,
        kind: FailureKind,
    },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::UserSubmit { text: text.into() }
    }

    pub fn draft(text: impl Into<String>) -> Self {
        Event::DraftChanged { text: text.into() }
    }
}
