//! Error types for the pagecraft generation pipeline.

use thiserror::Error;

/// Pipeline-wide error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Context retrieval failed: {0}")]
    RetrievalFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Image pipeline failed: {0}")]
    ImageFailed(String),

    #[error("Block conversion failed: {0}")]
    Conversion(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// True for failures that originate in an external service (vector search,
    /// text generation, image pipeline, provider transport).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ApiError::RetrievalFailed(_)
                | ApiError::GenerationFailed(_)
                | ApiError::ImageFailed(_)
                | ApiError::ProviderError(_)
                | ApiError::ProviderNotConfigured(_)
                | ApiError::ProviderRequestFailed(_)
                | ApiError::ProviderAuthFailed(_)
                | ApiError::ProviderRateLimit(_)
                | ApiError::ProviderModelNotFound(_)
        )
    }

    /// Collapse any upstream failure from the generation call into a single
    /// generation error; other variants pass through.
    pub fn into_generation_failure(self) -> ApiError {
        match self {
            ApiError::GenerationFailed(_) | ApiError::Validation(_) => self,
            other if other.is_upstream() => ApiError::GenerationFailed(other.to_string()),
            other => other,
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
