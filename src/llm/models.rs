//! Model catalog
//!
//! The relay only forwards to models listed here. Ids are what clients send
//! in `RelayRequest::model`; `api_name` is what goes to the provider.

/// Model served when neither the client nor the operator picks one
pub const DEFAULT_MODEL_ID: &str = "gpt-4";

/// Model definition with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "gpt-4o")
    pub id: &'static str,
    /// Name sent to the provider
    pub api_name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Context window size in tokens
    pub context_window: usize,
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gpt-4",
            api_name: "gpt-4",
            description: "GPT-4",
            context_window: 8_192,
        },
        ModelDef {
            id: "gpt-4-turbo",
            api_name: "gpt-4-turbo",
            description: "GPT-4 Turbo (larger context)",
            context_window: 128_000,
        },
        ModelDef {
            id: "gpt-4o",
            api_name: "gpt-4o",
            description: "GPT-4o (balanced, multimodal)",
            context_window: 128_000,
        },
        ModelDef {
            id: "gpt-4o-mini",
            api_name: "gpt-4o-mini",
            description: "GPT-4o Mini (fast, efficient)",
            context_window: 128_000,
        },
    ]
}

/// Look up a model by its user-facing id
pub fn find_model(id: &str) -> Option<&'static ModelDef> {
    all_models().iter().find(|m| m.id == id)
}
