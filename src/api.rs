//! HTTP API for the relay

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::relay::RelayService;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
}

impl AppState {
    pub fn new(relay: Arc<RelayService>) -> Self {
        Self { relay }
    }
}
