//! Effects produced by state transitions

use crate::message::Role;

/// Effects to be executed, in order, after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a message to the transcript with a freshly minted id
    AppendMessage { role: Role, content: String },

    /// Send the whole transcript to the relay for this turn
    RequestRelay { turn: u64 },

    /// Abort the in-flight relay request
    AbortRelay,

    /// Drop every message (new session)
    ClearTranscript,

    /// Tell observers the turn finished with a reply
    NotifyTurnDone,
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
