//! LLM provider abstraction
//!
//! The provider adapter: translates validated message envelopes into one
//! provider request and classifies whatever comes back.

mod config;
mod error;
mod models;
mod openai;
mod types;


pub use config::{build_service, shared_service, LlmConfig, OPENAI_BASE_URL};
pub use error::{LlmError, LlmErrorKind};
pub use models::{all_models, find_model, ModelDef, DEFAULT_MODEL_ID};
pub use openai::OpenAIService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make exactly one completion request. Implementations never retry.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Short provider name for logs
    fn provider_name(&self) -> &'static str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    provider = self.inner.provider_name(),
                    model = %request.model,
                    messages = request.messages.len(),
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    provider = self.inner.provider_name(),
                    model = %request.model,
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    error = %e.message,
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
