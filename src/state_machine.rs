//! Client-side session state machine
//!
//! Pure transitions over [`SessionState`]. The runtime owns the transcript and
//! performs the [`Effect`]s each transition asks for.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::{FailureKind, SessionConfig, SessionState, SessionStatus};
pub use transition::{transition, TransitionError, TransitionResult};
