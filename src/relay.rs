//! Relay service
//!
//! Validates a chat request, forwards it to the provider once, and
//! normalizes the outcome into the canonical reply or an opaque failure.
//! Holds no per-request state: every call is self-contained.

mod validate;

pub use validate::{validate_request, ValidatedRequest, ValidationError};

use crate::llm::{find_model, LlmError, LlmRequest, LlmService, ModelDef, DEFAULT_MODEL_ID};
use crate::message::{RelayReply, Role};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Message returned to callers for every provider-side failure
pub const GENERIC_FAILURE: &str = "Failed to process request";

/// Relay configuration
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    /// Model used when a request does not name one
    pub default_model: Option<String>,
    /// Upper bound on a single provider call. `None` waits indefinitely.
    pub provider_timeout: Option<Duration>,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self {
            default_model: std::env::var("PAIGE_DEFAULT_MODEL").ok(),
            provider_timeout: std::env::var("PAIGE_PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// Relay failure, split by where it was detected
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error("Provider error: {0}")]
    Provider(#[from] LlmError),
}

impl RelayError {
    /// What the caller is allowed to see. Provider detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::Validation(_) => self.to_string(),
            RelayError::Provider(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Stateless relay between clients and the provider
pub struct RelayService {
    llm: Arc<dyn LlmService>,
    default_model: &'static ModelDef,
    provider_timeout: Option<Duration>,
}

impl RelayService {
    pub fn new(llm: Arc<dyn LlmService>, config: &RelayConfig) -> Self {
        let default_model = match config.default_model.as_deref() {
            Some(id) => find_model(id).unwrap_or_else(|| {
                tracing::warn!(model = %id, fallback = DEFAULT_MODEL_ID, "Unknown default model");
                Self::builtin_default()
            }),
            None => Self::builtin_default(),
        };

        Self {
            llm,
            default_model,
            provider_timeout: config.provider_timeout,
        }
    }

    fn builtin_default() -> &'static ModelDef {
        find_model(DEFAULT_MODEL_ID).unwrap_or(&crate::llm::all_models()[0])
    }

    pub fn default_model(&self) -> &'static ModelDef {
        self.default_model
    }

    /// Handle one raw chat request body
    pub async fn relay(&self, body: &Value) -> Result<RelayReply, RelayError> {
        let validated = validate_request(body, self.default_model).inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected chat request");
        })?;

        let request = LlmRequest::new(validated.model.api_name, &validated.messages);
        let response = self.call_provider(&request).await?;

        Ok(RelayReply {
            role: Role::Assistant,
            content: response.text,
            id: uuid::Uuid::new_v4().to_string(),
        })
    }

    async fn call_provider(
        &self,
        request: &LlmRequest,
    ) -> Result<crate::llm::LlmResponse, LlmError> {
        match self.provider_timeout {
            Some(limit) => tokio::time::timeout(limit, self.llm.complete(request))
                .await
                .map_err(|_| {
                    tracing::error!(
                        model = %request.model,
                        timeout_ms = %limit.as_millis(),
                        "Provider call timed out"
                    );
                    LlmError::network(format!(
                        "Provider did not answer within {}s",
                        limit.as_secs_f64()
                    ))
                })?,
            None => self.llm.complete(request).await,
        }
    }
}
