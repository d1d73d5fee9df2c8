//! Pipeline facade
//!
//! Wires configuration into the section and outline orchestrators. Callers
//! outside the crate (the CLI, embedding services) go through [`PipelineApi`].

use crate::blocks::PreferenceResolver;
use crate::blueprint::Blueprint;
use crate::config::PagecraftConfig;
use crate::cost::{CostEstimator, InMemoryCostLedger};
use crate::error::ApiError;
use crate::outline::{OutlineOrchestrator, OutlineParams, OutlineResult};
use crate::provider::{CompletionOptions, ProviderGenerator, TextGenerator};
use crate::request::GenerationRequest;
use crate::retrieval::{ContextRetriever, HttpVectorSearch, VectorSearch};
use crate::section::{GeneratedSection, SectionOrchestrator};
use std::sync::Arc;
use tracing::info;

pub struct PipelineApi {
    sections: Option<SectionOrchestrator>,
    outlines: OutlineOrchestrator,
    estimator: CostEstimator,
    ledger: Arc<InMemoryCostLedger>,
}

impl PipelineApi {
    pub fn from_config(config: &PagecraftConfig) -> Result<Self, ApiError> {
        let estimator = CostEstimator::new(config.generation.rate_table());
        let ledger = Arc::new(InMemoryCostLedger::new());

        let generator = match config.generation_provider() {
            Some((name, provider)) => {
                let mut provider = provider.clone();
                provider.provider_name.get_or_insert_with(|| name.to_string());
                let options = CompletionOptions {
                    max_tokens: Some(config.generation.max_tokens),
                    ..provider.default_options.clone()
                };
                let generator: Arc<dyn TextGenerator> = Arc::new(
                    ProviderGenerator::new(provider.create_client()?, estimator.clone())
                        .with_options(options),
                );
                Some(generator)
            }
            None => None,
        };

        let search = match &config.retrieval.endpoint {
            Some(endpoint) => {
                let search: Arc<dyn VectorSearch> = Arc::new(HttpVectorSearch::new(
                    endpoint.clone(),
                    config.retrieval.api_key.clone(),
                )?);
                Some(search)
            }
            None => None,
        };
        // Section grounding always runs with the fixed default limits; the
        // configured k/min_score only tune outline grounding.
        let section_retriever = search.as_ref().map(|search| {
            Arc::new(
                ContextRetriever::new(Arc::clone(search))
                    .with_namespaces(config.retrieval.namespaces.clone()),
            )
        });
        let outline_retriever = search.as_ref().map(|search| {
            Arc::new(
                ContextRetriever::new(Arc::clone(search))
                    .with_limits(config.retrieval.k, config.retrieval.min_score)
                    .with_namespaces(config.generation.namespaces.clone()),
            )
        });

        let sections = generator.as_ref().map(|generator| {
            let mut orchestrator = SectionOrchestrator::new(Arc::clone(generator))
                .with_resolver(Arc::new(PreferenceResolver::new(
                    config.blocks.installed.clone(),
                )))
                .with_ledger(ledger.clone());
            if let Some(retriever) = section_retriever {
                orchestrator = orchestrator.with_retriever(retriever);
            }
            orchestrator
        });

        let mut outlines = match &generator {
            Some(generator) => OutlineOrchestrator::new(Arc::clone(generator), estimator.clone())
                .with_stub_mode(config.generation.forces_stub()),
            None => OutlineOrchestrator::offline(),
        }
        .with_ledger(ledger.clone());
        if let Some(retriever) = outline_retriever {
            outlines = outlines.with_retriever(retriever);
        }

        info!(
            provider = config.generation.provider.as_deref().unwrap_or("none"),
            retrieval = search.is_some(),
            stub_mode = config.generation.forces_stub(),
            "Pipeline initialized"
        );

        Ok(Self {
            sections,
            outlines,
            estimator,
            ledger,
        })
    }

    /// Replace the section orchestrator, e.g. to attach an image pipeline.
    pub fn with_sections(mut self, sections: SectionOrchestrator) -> Self {
        self.sections = Some(sections);
        self
    }

    pub fn with_outlines(mut self, outlines: OutlineOrchestrator) -> Self {
        self.outlines = outlines;
        self
    }

    pub async fn generate_section(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedSection, ApiError> {
        let sections = self.sections.as_ref().ok_or_else(|| {
            ApiError::ProviderNotConfigured(
                "Section generation needs generation.provider to be set".to_string(),
            )
        })?;
        sections.generate(request).await
    }

    pub async fn generate_outline(
        &self,
        params: &OutlineParams,
        blueprint: &Blueprint,
    ) -> OutlineResult {
        self.outlines.generate(params, blueprint).await
    }

    pub fn estimator(&self) -> &CostEstimator {
        &self.estimator
    }

    pub fn ledger(&self) -> &InMemoryCostLedger {
        &self.ledger
    }
}
