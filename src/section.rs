//! Section Orchestrator
//!
//! Generates one section end to end: resolve the block, retrieve grounding
//! context, generate, convert to blocks, extract citations, optionally attach
//! an image, and assemble the result with metadata.
//!
//! Only validation, block resolution, generation and conversion failures reach
//! the caller. Retrieval and image failures are logged and replaced with empty
//! defaults.

use crate::blocks::{count_words, BlockConverter, BlockNode, BlockResolver, PreferenceResolver};
use crate::citation::CitationExtractor;
use crate::cost::CostLedger;
use crate::error::ApiError;
use crate::image::{build_image_request, should_request_image, ImagePipeline};
use crate::prompt::SectionPrompt;
use crate::provider::TextGenerator;
use crate::request::{GenerationRequest, ResolvedMode};
use crate::retrieval::ContextRetriever;
use crate::types::{BlockSpecification, Citation, ContextChunk, MediaAsset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Rendered markup plus the structured block tree it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionContent {
    pub markup: String,
    pub blocks: BlockNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMetadata {
    pub mode: String,
    pub alpha: f64,
    pub word_count: usize,
    pub token_count: u32,
    pub cost_usd: f64,
    pub processing_time_ms: u64,
    /// Set by callers that serve cached results; always false here
    pub cache_hit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSection {
    pub section_id: String,
    pub content: SectionContent,
    pub block_type: BlockSpecification,
    pub citations: Vec<Citation>,
    pub media_id: Option<String>,
    pub media: Option<MediaAsset>,
    pub metadata: SectionMetadata,
}

pub struct SectionOrchestrator {
    generator: Arc<dyn TextGenerator>,
    resolver: Arc<dyn BlockResolver>,
    retriever: Option<Arc<ContextRetriever>>,
    images: Option<Arc<dyn ImagePipeline>>,
    ledger: Option<Arc<dyn CostLedger>>,
    converter: BlockConverter,
    citations: CitationExtractor,
}

impl SectionOrchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            resolver: Arc::new(PreferenceResolver::default()),
            retriever: None,
            images: None,
            ledger: None,
            converter: BlockConverter::default(),
            citations: CitationExtractor::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn BlockResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<ContextRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_images(mut self, images: Arc<dyn ImagePipeline>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn CostLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_converter(mut self, converter: BlockConverter) -> Self {
        self.converter = converter;
        self
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedSection, ApiError> {
        let started = Instant::now();
        let mode = request.resolve_mode()?;
        let block = self.resolver.resolve(&request.block_preferences)?;

        info!(
            section_id = %request.section_id,
            mode = mode.name(),
            block = %block.block_name,
            fallback_used = block.fallback_used,
            "Generating section"
        );

        let chunks = self.retrieve_context(request, &mode).await;

        let prompt = SectionPrompt {
            brief: &request.content_brief,
            block: &block,
            mode: &mode,
            chunks: &chunks,
        }
        .render();

        let output = self
            .generator
            .generate(&prompt, &mode, Some(&block))
            .await
            .map_err(ApiError::into_generation_failure)?;

        let blocks = self
            .converter
            .convert(&request.section_id, &output.content, &block)?;
        let markup = self.converter.render(&blocks, &block);

        let citations =
            self.citations
                .extract(&output.content, &chunks, &request.citation_settings);

        let media = self.attach_image(request, &block).await;

        if let Some(ledger) = &self.ledger {
            ledger.add(output.cost_usd);
            if let Some(asset) = &media {
                ledger.add(asset.cost_usd);
            }
        }

        let metadata = SectionMetadata {
            mode: mode.name().to_string(),
            alpha: request.clamped_alpha(),
            word_count: count_words(&markup),
            token_count: output.token_count,
            cost_usd: output.cost_usd.max(0.0),
            processing_time_ms: started.elapsed().as_millis() as u64,
            cache_hit: false,
        };

        info!(
            section_id = %request.section_id,
            words = metadata.word_count,
            citations = citations.len(),
            has_media = media.is_some(),
            cost_usd = metadata.cost_usd,
            elapsed_ms = metadata.processing_time_ms,
            "Section generated"
        );

        Ok(GeneratedSection {
            section_id: request.section_id.clone(),
            content: SectionContent { markup, blocks },
            block_type: block,
            citations,
            media_id: media.as_ref().map(|m| m.id.clone()),
            media,
            metadata,
        })
    }

    async fn retrieve_context(
        &self,
        request: &GenerationRequest,
        mode: &ResolvedMode,
    ) -> Vec<ContextChunk> {
        if !mode.uses_retrieval() {
            return Vec::new();
        }
        let Some(retriever) = &self.retriever else {
            debug!(section_id = %request.section_id, "No context retriever configured");
            return Vec::new();
        };
        match retriever.retrieve(&request.content_brief).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(
                    section_id = %request.section_id,
                    error = %e,
                    "Context retrieval failed, continuing without grounding"
                );
                Vec::new()
            }
        }
    }

    async fn attach_image(
        &self,
        request: &GenerationRequest,
        block: &BlockSpecification,
    ) -> Option<MediaAsset> {
        if !should_request_image(request.image_requirements.policy, &block.section_type) {
            return None;
        }
        let Some(images) = &self.images else {
            debug!(section_id = %request.section_id, "Image wanted but no image pipeline configured");
            return None;
        };
        let image_request = build_image_request(
            &request.content_brief,
            &block.section_type,
            &request.image_requirements,
        );
        match images.request(&image_request).await {
            Ok(asset) => Some(asset),
            Err(e) => {
                warn!(
                    section_id = %request.section_id,
                    error = %e,
                    "Image pipeline failed, continuing without media"
                );
                None
            }
        }
    }
}
