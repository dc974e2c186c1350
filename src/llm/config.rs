//! Provider configuration and the process-wide service
//!
//! The provider service is built exactly once, on first use, from the
//! environment. Everything after that shares the same read-only instance.

use super::{LlmService, LoggingService, OpenAIService};
use std::sync::{Arc, OnceLock};

/// Default `OpenAI` API root
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for the LLM provider
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// Alternate API root (proxy or compatible gateway)
    pub base_url: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: std::env::var("OPENAI_BASE_URL").ok(),
        }
    }

    /// API key, treating an empty value as absent
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(OPENAI_BASE_URL)
    }
}

/// Build a provider service from explicit configuration, wrapped with logging
pub fn build_service(config: &LlmConfig) -> Arc<dyn LlmService> {
    let service = OpenAIService::new(
        config.api_key().map(str::to_string),
        config.base_url(),
    );
    tracing::info!(
        endpoint = %service.endpoint(),
        has_key = config.api_key().is_some(),
        "Building provider service"
    );
    Arc::new(LoggingService::new(Arc::new(service)))
}

static SHARED_SERVICE: OnceLock<Arc<dyn LlmService>> = OnceLock::new();

/// The process-wide provider service, initialized from the environment on
/// first call.
pub fn shared_service() -> Arc<dyn LlmService> {
    SHARED_SERVICE
        .get_or_init(|| {
            let config = LlmConfig::from_env();
            if config.api_key().is_none() {
                tracing::warn!("OPENAI_API_KEY is not set; every chat request will fail");
            }
            tracing::info!("Initializing shared LLM provider");
            build_service(&config)
        })
        .clone()
}
