//! Provider profiles: configured generation services and their conversion to clients.

use crate::error::ApiError;
use crate::provider::{CompletionOptions, ModelProvider, ModelProviderClient, ProviderFactory};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "local")]
    LocalCustom,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Ollama => "ollama",
            ProviderType::LocalCustom => "local",
        }
    }

    /// Environment variable consulted when no api_key is configured.
    fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderType::Ollama | ProviderType::LocalCustom => None,
        }
    }
}

/// One configured generation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider_name: Option<String>,
    pub provider_type: ProviderType,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub default_options: CompletionOptions,
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(format!("Endpoint must be an http(s) URL, got '{}'", endpoint));
            }
        }
        if self.provider_type == ProviderType::LocalCustom && self.endpoint.is_none() {
            return Err("Local providers require an endpoint".to_string());
        }
        if let Some(temp) = self.default_options.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(format!("Temperature must be within 0.0-2.0, got {}", temp));
            }
        }
        Ok(())
    }

    fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            self.provider_type
                .api_key_env()
                .and_then(|var| std::env::var(var).ok())
        })
    }

    pub fn to_model_provider(&self) -> Result<ModelProvider, ApiError> {
        let model = self.model.clone();
        let missing_key = || {
            ApiError::ProviderNotConfigured(format!(
                "No API key for {} provider '{}'",
                self.provider_type.as_str(),
                self.provider_name.as_deref().unwrap_or(&self.model)
            ))
        };
        Ok(match self.provider_type {
            ProviderType::OpenAI => ModelProvider::OpenAI {
                model,
                api_key: self.resolve_api_key().ok_or_else(missing_key)?,
                base_url: self.endpoint.clone(),
            },
            ProviderType::Anthropic => ModelProvider::Anthropic {
                model,
                api_key: self.resolve_api_key().ok_or_else(missing_key)?,
            },
            ProviderType::Ollama => ModelProvider::Ollama {
                model,
                base_url: self.endpoint.clone(),
            },
            ProviderType::LocalCustom => ModelProvider::LocalCustom {
                model,
                endpoint: self.endpoint.clone().ok_or_else(|| {
                    ApiError::ProviderNotConfigured("Local provider has no endpoint".to_string())
                })?,
                api_key: self.api_key.clone(),
            },
        })
    }

    pub fn create_client(&self) -> Result<Box<dyn ModelProviderClient>, ApiError> {
        ProviderFactory::create_client(&self.to_model_provider()?)
    }
}
