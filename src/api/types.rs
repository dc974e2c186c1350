//! API response types not shared with the session client

use serde::Serialize;

/// Model information with metadata
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub description: String,
    pub context_window: usize,
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
}

/// Response for `/version`
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}
