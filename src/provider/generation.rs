//! Generation client adapter: prompt + mode in, raw text + usage + cost out.

use crate::cost::{estimate_tokens, CostEstimator};
use crate::error::ApiError;
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use crate::request::ResolvedMode;
use crate::types::BlockSpecification;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are a web copywriter producing content for page sections. \
Follow the block requirements exactly and stay faithful to any reference context provided.";

/// Raw generation result with usage metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub token_count: u32,
    pub cost_usd: f64,
}

/// Text-generation capability consumed by the orchestrators
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        mode: &ResolvedMode,
        block: Option<&BlockSpecification>,
    ) -> Result<GenerationOutput, ApiError>;

    /// Service name used to look up cost rates.
    fn service_name(&self) -> &str;
}

/// Sampling temperature for a mode: grounded stays close to sources, generative roams.
pub fn temperature_for(mode: &ResolvedMode) -> f32 {
    match mode {
        ResolvedMode::Grounded | ResolvedMode::Stub => 0.3,
        ResolvedMode::Hybrid { alpha } => (0.3 + 0.6 * (1.0 - alpha)) as f32,
        ResolvedMode::Generative => 0.9,
    }
}

/// Adapts a [`ModelProviderClient`] to the [`TextGenerator`] contract.
pub struct ProviderGenerator {
    client: Box<dyn ModelProviderClient>,
    estimator: CostEstimator,
    options: CompletionOptions,
}

impl ProviderGenerator {
    pub fn new(client: Box<dyn ModelProviderClient>, estimator: CostEstimator) -> Self {
        Self {
            client,
            estimator,
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    fn system_prompt(block: Option<&BlockSpecification>) -> String {
        match block {
            Some(block) => format!(
                "{} Target block family: {} ({}).",
                SYSTEM_PROMPT, block.plugin, block.block_name
            ),
            None => SYSTEM_PROMPT.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    async fn generate(
        &self,
        prompt: &str,
        mode: &ResolvedMode,
        block: Option<&BlockSpecification>,
    ) -> Result<GenerationOutput, ApiError> {
        let system = Self::system_prompt(block);
        let messages = vec![ChatMessage::system(system.clone()), ChatMessage::user(prompt)];
        let mut options = self.options.clone();
        options.temperature = Some(temperature_for(mode));

        let response = self.client.complete(messages, options).await?;
        if response.content.trim().is_empty() {
            return Err(ApiError::GenerationFailed(format!(
                "{} returned empty content",
                self.client.provider_name()
            )));
        }

        // Prefer provider-reported usage; fall back to the length heuristic.
        let (prompt_tokens, completion_tokens) = if response.usage.total_tokens > 0 {
            (response.usage.prompt_tokens, response.usage.completion_tokens)
        } else {
            (
                estimate_tokens(&system).saturating_add(estimate_tokens(prompt)),
                estimate_tokens(&response.content),
            )
        };
        let cost_usd = self.estimator.estimate(
            self.client.provider_name(),
            prompt_tokens,
            completion_tokens,
        );

        debug!(
            provider = self.client.provider_name(),
            model = %response.model,
            prompt_tokens,
            completion_tokens,
            cost_usd,
            "Generation completed"
        );

        Ok(GenerationOutput {
            content: response.content,
            prompt_tokens,
            completion_tokens,
            token_count: prompt_tokens.saturating_add(completion_tokens),
            cost_usd,
        })
    }

    fn service_name(&self) -> &str {
        self.client.provider_name()
    }
}
