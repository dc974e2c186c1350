//! Paige - a chat relay and the client-side session that talks to it
//!
//! The relay (`api`, `relay`, `llm`) validates chat requests and forwards them
//! to the model provider. The session (`state_machine`, `runtime`) keeps the
//! transcript and enforces one request in flight at a time.

#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

pub mod api;
pub mod llm;
pub mod message;
pub mod relay;
pub mod runtime;
pub mod state_machine;
