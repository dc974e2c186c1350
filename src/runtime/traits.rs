//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::message::{ErrorResponse, RelayReply, RelayRequest};
use crate::state_machine::FailureKind;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A relay round trip that produced no usable reply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RelayFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RelayFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Relay answered with a non-2xx status
    pub fn relay(status: u16, message: impl Into<String>) -> Self {
        Self::new(
            FailureKind::Relay,
            format!("HTTP {status}: {}", message.into()),
        )
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Network, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Malformed, message)
    }

    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            FailureKind::Timeout,
            format!("No reply within {}s", limit.as_secs_f64()),
        )
    }
}

/// Client for the relay's `POST /api/chat`
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Send the whole transcript and wait for one reply
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, RelayFailure>;
}

#[async_trait]
impl<T: RelayClient + ?Sized> RelayClient for Arc<T> {
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, RelayFailure> {
        (**self).send(request).await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

/// Talks to a running relay over HTTP
#[derive(Clone)]
pub struct HttpRelayClient {
    client: Client,
    endpoint: String,
}

impl HttpRelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, request: &RelayRequest) -> Result<RelayReply, RelayFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| RelayFailure::network(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayFailure::network(format!("Failed to read body: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map_or_else(|_| "no error body".to_string(), |e| e.error);
            return Err(RelayFailure::relay(status.as_u16(), message));
        }

        serde_json::from_str(&body)
            .map_err(|e| RelayFailure::malformed(format!("Unreadable reply: {e}")))
    }
}
