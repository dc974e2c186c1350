//! Inbound request validation
//!
//! The relay body arrives as untyped JSON. It is checked field by field into
//! a `ValidatedRequest` before anything downstream touches it.

use crate::llm::{find_model, ModelDef};
use crate::message::{has_content, ChatMessage, Role};
use serde_json::Value;
use thiserror::Error;

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub model: &'static ModelDef,
    pub messages: Vec<ChatMessage>,
}

/// Why a relay request was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Request body is not a JSON object")]
    MalformedBody,
    #[error("Request has no messages array")]
    MissingMessages,
    #[error("Request has no messages")]
    EmptyMessages,
    #[error("Message {index} is not an object")]
    MalformedMessage { index: usize },
    #[error("Message {index} has no role")]
    MissingRole { index: usize },
    #[error("Message {index} has unsupported role '{role}'")]
    UnknownRole { index: usize, role: String },
    #[error("Message {index} has no content")]
    MissingContent { index: usize },
    #[error("Message {index} has empty content")]
    EmptyContent { index: usize },
    #[error("Unknown model '{0}'")]
    UnknownModel(String),
}

/// Validate a raw relay body. `default_model` is used when the body names none.
pub fn validate_request(
    body: &Value,
    default_model: &'static ModelDef,
) -> Result<ValidatedRequest, ValidationError> {
    let object = body.as_object().ok_or(ValidationError::MalformedBody)?;

    let raw_messages = object
        .get("messages")
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingMessages)?;

    if raw_messages.is_empty() {
        return Err(ValidationError::EmptyMessages);
    }

    let messages = raw_messages
        .iter()
        .enumerate()
        .map(|(index, raw)| validate_message(index, raw))
        .collect::<Result<Vec<_>, _>>()?;

    let model = match object.get("model") {
        None | Some(Value::Null) => default_model,
        Some(Value::String(id)) => {
            find_model(id).ok_or_else(|| ValidationError::UnknownModel(id.clone()))?
        }
        Some(other) => return Err(ValidationError::UnknownModel(other.to_string())),
    };

    Ok(ValidatedRequest { model, messages })
}

fn validate_message(index: usize, raw: &Value) -> Result<ChatMessage, ValidationError> {
    let object = raw
        .as_object()
        .ok_or(ValidationError::MalformedMessage { index })?;

    let role = match object.get("role") {
        None | Some(Value::Null) => return Err(ValidationError::MissingRole { index }),
        Some(Value::String(role)) => {
            Role::parse(role).ok_or_else(|| ValidationError::UnknownRole {
                index,
                role: role.clone(),
            })?
        }
        Some(other) => {
            return Err(ValidationError::UnknownRole {
                index,
                role: other.to_string(),
            })
        }
    };

    let content = match object.get("content") {
        Some(Value::String(content)) => content,
        _ => return Err(ValidationError::MissingContent { index }),
    };

    if !has_content(content) {
        return Err(ValidationError::EmptyContent { index });
    }

    Ok(ChatMessage {
        role,
        content: content.clone(),
    })
}
