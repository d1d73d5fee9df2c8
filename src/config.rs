//! Configuration
//!
//! Layered configuration for providers, generation, retrieval, block families
//! and logging. See [`ConfigLoader`] for source precedence.

use crate::cost::{RateTable, ServiceRates};
use crate::logging::LoggingConfig;
use crate::retrieval::{DEFAULT_K, DEFAULT_MIN_SCORE};
use crate::types::BlockFamily;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagecraftConfig {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub retrieval: RetrievalSettings,

    #[serde(default)]
    pub blocks: BlockSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Key into `providers`; no provider means every outline is a stub
    #[serde(default)]
    pub provider: Option<String>,

    /// Forces stub outlines regardless of provider
    #[serde(default)]
    pub stub_mode: bool,

    /// Development flag, same effect as `stub_mode` but meant for local runs
    #[serde(default)]
    pub development: bool,

    /// Vector namespaces used to ground live outlines
    #[serde(default)]
    pub namespaces: Vec<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-service price overrides, merged over the built-in rate table
    #[serde(default)]
    pub rates: HashMap<String, ServiceRates>,
}

fn default_max_tokens() -> u32 {
    1500
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: None,
            stub_mode: false,
            development: false,
            namespaces: Vec::new(),
            max_tokens: default_max_tokens(),
            rates: HashMap::new(),
        }
    }
}

impl GenerationSettings {
    pub fn forces_stub(&self) -> bool {
        self.stub_mode || self.development
    }

    pub fn rate_table(&self) -> RateTable {
        RateTable::with_overrides(&self.rates)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Vector search service base URL; retrieval is disabled without one
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_k")]
    pub k: usize,

    #[serde(default = "default_min_score")]
    pub min_score: f64,

    #[serde(default)]
    pub namespaces: Vec<String>,
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            k: default_k(),
            min_score: default_min_score(),
            namespaces: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSettings {
    /// Block families installed on the target site; core is always available
    #[serde(default = "default_installed")]
    pub installed: Vec<BlockFamily>,
}

fn default_installed() -> Vec<BlockFamily> {
    vec![
        BlockFamily::Kadence,
        BlockFamily::GenerateBlocks,
        BlockFamily::Core,
    ]
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            installed: default_installed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Provider(String, String),
    Generation(String),
    Retrieval(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(name, msg) => write!(f, "Provider '{}': {}", name, msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Retrieval(msg) => write!(f, "Retrieval: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

impl PagecraftConfig {
    /// Collects every problem rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (name, provider) in &self.providers {
            if let Err(e) = provider.validate() {
                errors.push(ValidationError::Provider(name.clone(), e));
            }
        }

        if let Some(name) = &self.generation.provider {
            if !self.providers.contains_key(name) {
                errors.push(ValidationError::Generation(format!(
                    "provider '{}' is not configured",
                    name
                )));
            }
        }
        if self.generation.max_tokens == 0 {
            errors.push(ValidationError::Generation(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        for (service, rates) in &self.generation.rates {
            if rates.input_per_1k < 0.0 || rates.output_per_1k < 0.0 {
                errors.push(ValidationError::Generation(format!(
                    "rates for '{}' must not be negative",
                    service
                )));
            }
        }

        if let Some(endpoint) = &self.retrieval.endpoint {
            if !is_http_url(endpoint) {
                errors.push(ValidationError::Retrieval(format!(
                    "endpoint must be an http(s) URL, got '{}'",
                    endpoint
                )));
            }
        }
        if self.retrieval.k == 0 {
            errors.push(ValidationError::Retrieval(
                "k must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retrieval.min_score) {
            errors.push(ValidationError::Retrieval(format!(
                "min_score must be within 0.0-1.0, got {}",
                self.retrieval.min_score
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The provider named by `generation.provider`, if any.
    pub fn generation_provider(&self) -> Option<(&str, &ProviderConfig)> {
        let name = self.generation.provider.as_deref()?;
        self.providers.get(name).map(|p| (name, p))
    }
}
