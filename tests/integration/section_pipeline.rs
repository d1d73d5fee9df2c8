//! End-to-end section generation with recorded external capabilities.

use super::support::{RecordingImages, RecordingLedger, ScriptedGenerator, StaticSearch};
use pagecraft::blocks::PreferenceResolver;
use pagecraft::error::ApiError;
use pagecraft::request::{GenerationMode, GenerationRequest, ImagePolicy, ResolvedMode};
use pagecraft::retrieval::ContextRetriever;
use pagecraft::section::SectionOrchestrator;
use pagecraft::types::{BlockFamily, ContextChunk};
use std::sync::Arc;

const GENERATED: &str =
    "Fresh sourdough baked every morning in our wood-fired oven. Visit us downtown.";
const BRIEF: &str = "Introduce the bakery and its signature sourdough";

fn bakery_chunk() -> ContextChunk {
    let mut chunk = ContextChunk::new(
        "Our sourdough is baked every morning in a wood-fired oven downtown.",
        0.82,
        "kb-oven",
    );
    chunk.source_title = Some("Bakery facts".to_string());
    chunk
}

fn request(mode: GenerationMode) -> GenerationRequest {
    let mut request = GenerationRequest::new("sec-about", BRIEF);
    request.mode = mode;
    request.image_requirements.policy = ImagePolicy::None;
    request
}

fn retriever(search: Arc<StaticSearch>) -> Arc<ContextRetriever> {
    Arc::new(ContextRetriever::new(search))
}

#[tokio::test]
async fn grounded_section_cites_retrieved_context() {
    let generator = Arc::new(ScriptedGenerator::replying(GENERATED));
    let search = Arc::new(StaticSearch::with_chunks(vec![bakery_chunk()]));
    let ledger = Arc::new(RecordingLedger::default());
    let orchestrator = SectionOrchestrator::new(generator.clone())
        .with_retriever(retriever(search.clone()))
        .with_ledger(ledger.clone());

    let section = orchestrator
        .generate(&request(GenerationMode::Grounded))
        .await
        .unwrap();

    assert_eq!(search.queries.lock().as_slice(), [BRIEF.to_string()]);
    assert!(generator.prompts.lock()[0].contains("Reference context:\n[1] "));

    assert_eq!(section.section_id, "sec-about");
    assert_eq!(section.citations.len(), 1);
    assert_eq!(section.citations[0].source, "kb-oven");
    assert_eq!(
        section.citations[0].text,
        "Fresh sourdough baked every morning in our wood-fired oven."
    );

    let metadata = &section.metadata;
    assert_eq!(metadata.mode, "grounded");
    assert_eq!(metadata.alpha, 0.5);
    assert_eq!(metadata.word_count, 12);
    assert_eq!(metadata.token_count, 200);
    assert_eq!(metadata.cost_usd, 0.0036);
    assert!(!metadata.cache_hit);
    assert_eq!(ledger.entries.lock().as_slice(), [0.0036]);
}

#[tokio::test]
async fn retrieval_failure_is_absorbed() {
    let generator = Arc::new(ScriptedGenerator::replying(GENERATED));
    let search = Arc::new(StaticSearch::unavailable());
    let orchestrator =
        SectionOrchestrator::new(generator.clone()).with_retriever(retriever(search.clone()));

    let section = orchestrator
        .generate(&request(GenerationMode::Hybrid))
        .await
        .unwrap();

    assert_eq!(search.queries.lock().len(), 1);
    assert!(section.citations.is_empty());
    assert!(!generator.prompts.lock()[0].contains("Reference context"));
    assert_eq!(section.metadata.mode, "hybrid");
}

#[tokio::test]
async fn generative_mode_skips_retrieval() {
    let generator = Arc::new(ScriptedGenerator::replying(GENERATED));
    let search = Arc::new(StaticSearch::with_chunks(vec![bakery_chunk()]));
    let orchestrator =
        SectionOrchestrator::new(generator.clone()).with_retriever(retriever(search.clone()));

    let section = orchestrator
        .generate(&request(GenerationMode::Generative))
        .await
        .unwrap();

    assert!(search.queries.lock().is_empty());
    assert!(section.citations.is_empty());
    assert_eq!(*generator.modes.lock(), vec![ResolvedMode::Generative]);
}

#[tokio::test]
async fn alpha_is_clamped_before_use() {
    let generator = Arc::new(ScriptedGenerator::replying(GENERATED));
    let orchestrator = SectionOrchestrator::new(generator.clone());

    let mut over = request(GenerationMode::Hybrid);
    over.alpha = 3.5;
    let section = orchestrator.generate(&over).await.unwrap();
    assert_eq!(section.metadata.alpha, 1.0);
    assert_eq!(
        generator.modes.lock()[0],
        ResolvedMode::Hybrid { alpha: 1.0 }
    );
    assert!(generator.prompts.lock()[0].contains("Context weight (alpha): 1.00"));

    let mut under = request(GenerationMode::Hybrid);
    under.alpha = -0.25;
    let section = orchestrator.generate(&under).await.unwrap();
    assert_eq!(section.metadata.alpha, 0.0);
}

#[tokio::test]
async fn image_policy_none_never_calls_pipeline() {
    let images = Arc::new(RecordingImages::working());
    let orchestrator = SectionOrchestrator::new(Arc::new(ScriptedGenerator::replying(GENERATED)))
        .with_images(images.clone());

    let mut hero = request(GenerationMode::Generative);
    hero.block_preferences.section_type = "hero".to_string();
    let section = orchestrator.generate(&hero).await.unwrap();

    assert_eq!(images.calls(), 0);
    assert!(section.media.is_none());
    assert!(section.media_id.is_none());
}

#[tokio::test]
async fn required_image_calls_pipeline_exactly_once() {
    let images = Arc::new(RecordingImages::working());
    let ledger = Arc::new(RecordingLedger::default());
    let orchestrator = SectionOrchestrator::new(Arc::new(ScriptedGenerator::replying(GENERATED)))
        .with_images(images.clone())
        .with_ledger(ledger.clone());

    let mut req = request(GenerationMode::Generative);
    req.image_requirements.policy = ImagePolicy::Required;
    let section = orchestrator.generate(&req).await.unwrap();

    assert_eq!(images.calls(), 1);
    assert_eq!(section.media_id.as_deref(), Some("media-42"));
    assert_eq!(
        images.requests.lock()[0].alt_text,
        "Introduce the bakery and its signature sourdough"
    );
    assert!((ledger.total() - 0.0436).abs() < 1e-9);
    assert_eq!(section.metadata.cost_usd, 0.0036);
}

#[tokio::test]
async fn required_image_is_requested_once_for_every_section_type() {
    for section_type in ["hero", "faq", "pricing", "content"] {
        let images = Arc::new(RecordingImages::working());
        let orchestrator =
            SectionOrchestrator::new(Arc::new(ScriptedGenerator::replying(GENERATED)))
                .with_images(images.clone());

        let mut req = request(GenerationMode::Generative);
        req.image_requirements.policy = ImagePolicy::Required;
        req.block_preferences.section_type = section_type.to_string();
        let section = orchestrator.generate(&req).await.unwrap();

        assert_eq!(images.calls(), 1, "section type {}", section_type);
        assert!(section.media.is_some(), "section type {}", section_type);
    }
}

#[tokio::test]
async fn optional_image_follows_section_type() {
    let images = Arc::new(RecordingImages::working());
    let orchestrator = SectionOrchestrator::new(Arc::new(ScriptedGenerator::replying(GENERATED)))
        .with_images(images.clone());

    let mut hero = request(GenerationMode::Generative);
    hero.image_requirements.policy = ImagePolicy::Optional;
    hero.block_preferences.section_type = "hero".to_string();
    assert!(orchestrator.generate(&hero).await.unwrap().media.is_some());

    let mut faq = hero.clone();
    faq.block_preferences.section_type = "faq".to_string();
    assert!(orchestrator.generate(&faq).await.unwrap().media.is_none());

    assert_eq!(images.calls(), 1);
}

#[tokio::test]
async fn image_failure_is_absorbed() {
    let images = Arc::new(RecordingImages::broken());
    let orchestrator = SectionOrchestrator::new(Arc::new(ScriptedGenerator::replying(GENERATED)))
        .with_images(images.clone());

    let mut req = request(GenerationMode::Generative);
    req.image_requirements.policy = ImagePolicy::Required;
    let section = orchestrator.generate(&req).await.unwrap();

    assert_eq!(images.calls(), 1);
    assert!(section.media.is_none());
}

#[tokio::test]
async fn generation_failure_propagates_and_stops_the_pipeline() {
    let images = Arc::new(RecordingImages::working());
    let ledger = Arc::new(RecordingLedger::default());
    let orchestrator = SectionOrchestrator::new(Arc::new(ScriptedGenerator::failing("HTTP 500")))
        .with_images(images.clone())
        .with_ledger(ledger.clone());

    let mut req = request(GenerationMode::Generative);
    req.image_requirements.policy = ImagePolicy::Required;
    let err = orchestrator.generate(&req).await.unwrap_err();

    assert!(matches!(err, ApiError::GenerationFailed(_)));
    assert_eq!(images.calls(), 0);
    assert!(ledger.entries.lock().is_empty());
}

#[tokio::test]
async fn invalid_request_fails_before_any_call() {
    let generator = Arc::new(ScriptedGenerator::replying(GENERATED));
    let search = Arc::new(StaticSearch::with_chunks(vec![bakery_chunk()]));
    let orchestrator =
        SectionOrchestrator::new(generator.clone()).with_retriever(retriever(search.clone()));

    let mut req = request(GenerationMode::Grounded);
    req.content_brief = "too short".to_string();
    let err = orchestrator.generate(&req).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(generator.calls(), 0);
    assert!(search.queries.lock().is_empty());
}

#[tokio::test]
async fn missing_block_family_falls_back_to_core() {
    let orchestrator = SectionOrchestrator::new(Arc::new(ScriptedGenerator::replying(GENERATED)))
        .with_resolver(Arc::new(PreferenceResolver::new(vec![])));

    let mut req = request(GenerationMode::Generative);
    req.block_preferences.preferred_family = BlockFamily::Kadence;
    let section = orchestrator.generate(&req).await.unwrap();

    assert!(section.block_type.fallback_used);
    assert_eq!(section.block_type.block_name, "core/group");
    assert_eq!(
        section.content.markup,
        format!("<div class=\"wp-block-group\">{}</div>", GENERATED)
    );
    assert_eq!(section.content.blocks.content(), GENERATED);
}
