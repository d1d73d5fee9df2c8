//! CLI output: error mapping from domain errors to the CLI surface.

use crate::error::ApiError;

pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Validation(msg) => format!("Invalid request: {}", msg),
        ApiError::ProviderNotConfigured(msg) => format!("{}\n\nConfigure [generation] provider in config/config.toml.", msg),
        other => other.to_string(),
    }
}

pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}
