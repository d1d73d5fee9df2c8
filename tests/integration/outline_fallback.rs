//! Outline generation: live path, field fallback, and the live-to-stub fallback.

use super::support::{RecordingLedger, ScriptedGenerator, StaticSearch};
use pagecraft::blueprint::{Blueprint, MediaPolicy, SectionTemplate};
use pagecraft::cost::CostEstimator;
use pagecraft::outline::{OutlineMode, OutlineOrchestrator, OutlineParams};
use pagecraft::retrieval::ContextRetriever;
use std::sync::Arc;

const LIVE_RESPONSE: &str = r#"{"sections":[
  {"heading":"Bread worth waking up for","type":"hero","targetWords":90,"needsImage":true,"subheadings":[]},
  {"heading":"Our ovens","subheadings":["Wood-fired","Since 1987"]}
]}"#;

fn blueprint() -> Blueprint {
    Blueprint::new(
        "bp-bakery",
        vec![
            SectionTemplate::new("Hero", "hero", 150),
            SectionTemplate::new("About", "content", 400).with_media_policy(MediaPolicy::None),
            SectionTemplate::new("Visit", "cta", 80),
        ],
    )
}

fn params() -> OutlineParams {
    OutlineParams::new("Homepage for a neighborhood sourdough bakery")
}

#[tokio::test]
async fn failing_generator_falls_back_to_stub_once() {
    let generator = Arc::new(ScriptedGenerator::failing("HTTP 503"));
    let ledger = Arc::new(RecordingLedger::default());
    let orchestrator = OutlineOrchestrator::new(generator.clone(), CostEstimator::default())
        .with_ledger(ledger.clone());

    let outline = orchestrator.generate(&params(), &blueprint()).await;

    assert_eq!(outline.mode, OutlineMode::Stub);
    assert_eq!(outline.estimated_cost, 0.0);
    assert_eq!(generator.calls(), 1);
    assert!(ledger.entries.lock().is_empty());
    let headings: Vec<&str> = outline.sections.iter().map(|s| s.heading.as_str()).collect();
    assert_eq!(headings, vec!["Hero", "About", "Visit"]);
    assert_eq!(outline.total_words, 630);
    assert_eq!(outline.estimated_time_minutes, 4);
    assert_eq!(outline.blueprint_id, "bp-bakery");
}

#[tokio::test]
async fn unparseable_response_falls_back_to_stub() {
    let generator = Arc::new(ScriptedGenerator::replying("Sorry, I can't produce an outline."));
    let orchestrator = OutlineOrchestrator::new(generator.clone(), CostEstimator::default());

    let outline = orchestrator.generate(&params(), &blueprint()).await;
    assert_eq!(outline.mode, OutlineMode::Stub);
    assert_eq!(outline.estimated_cost, 0.0);
}

#[tokio::test]
async fn live_outline_prefers_service_fields_and_charges_ledger() {
    let generator = Arc::new(ScriptedGenerator::replying(LIVE_RESPONSE));
    let ledger = Arc::new(RecordingLedger::default());
    let orchestrator = OutlineOrchestrator::new(generator.clone(), CostEstimator::default())
        .with_ledger(ledger.clone());

    let outline = orchestrator.generate(&params(), &blueprint()).await;

    assert_eq!(outline.mode, OutlineMode::Hybrid);
    assert_eq!(outline.sections.len(), 2);

    let hero = &outline.sections[0];
    assert_eq!(hero.heading, "Bread worth waking up for");
    assert_eq!(hero.target_words, 90);
    assert!(hero.needs_image);

    let about = &outline.sections[1];
    assert_eq!(about.id, "section-2");
    assert_eq!(about.section_type, "content");
    assert_eq!(about.target_words, 400);
    assert!(!about.needs_image);
    assert_eq!(about.subheadings, vec!["Wood-fired", "Since 1987"]);

    assert_eq!(outline.total_words, 490);

    let prompt = generator.prompts.lock()[0].clone();
    assert!(prompt.contains("1. Hero (hero, 150 words, with images)"));
    assert!(prompt.contains("2. About (content, 400 words, without images)"));
    let expected = CostEstimator::default().estimate_text("openai", &prompt, LIVE_RESPONSE);
    assert!(expected > 0.0);
    assert_eq!(outline.estimated_cost, expected);
    assert_eq!(ledger.entries.lock().as_slice(), [expected]);
}

#[tokio::test]
async fn zero_live_sections_use_blueprint() {
    let generator = Arc::new(ScriptedGenerator::replying(r#"{"sections": []}"#));
    let orchestrator = OutlineOrchestrator::new(generator, CostEstimator::default());

    let outline = orchestrator.generate(&params(), &blueprint()).await;

    assert_eq!(outline.mode, OutlineMode::Hybrid);
    assert_eq!(outline.sections.len(), 3);
    assert!(!outline.sections[1].needs_image);
    assert_eq!(outline.sections[2].section_type, "cta");
}

#[tokio::test]
async fn development_flag_and_stub_switch_skip_the_service() {
    let generator = Arc::new(ScriptedGenerator::replying(LIVE_RESPONSE));

    let mut dev = params();
    dev.development = true;
    let outline = OutlineOrchestrator::new(generator.clone(), CostEstimator::default())
        .generate(&dev, &blueprint())
        .await;
    assert_eq!(outline.mode, OutlineMode::Stub);

    let outline = OutlineOrchestrator::new(generator.clone(), CostEstimator::default())
        .with_stub_mode(true)
        .generate(&params(), &blueprint())
        .await;
    assert_eq!(outline.mode, OutlineMode::Stub);

    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn outline_retrieval_needs_namespaces_and_tolerates_failure() {
    let generator = Arc::new(ScriptedGenerator::replying(LIVE_RESPONSE));

    let idle = Arc::new(StaticSearch::unavailable());
    let outline = OutlineOrchestrator::new(generator.clone(), CostEstimator::default())
        .with_retriever(Arc::new(ContextRetriever::new(idle.clone())))
        .generate(&params(), &blueprint())
        .await;
    assert_eq!(outline.mode, OutlineMode::Hybrid);
    assert!(idle.queries.lock().is_empty());

    let failing = Arc::new(StaticSearch::unavailable());
    let outline = OutlineOrchestrator::new(generator.clone(), CostEstimator::default())
        .with_retriever(Arc::new(
            ContextRetriever::new(failing.clone()).with_namespaces(vec!["bakery".to_string()]),
        ))
        .generate(&params(), &blueprint())
        .await;
    assert_eq!(outline.mode, OutlineMode::Hybrid);
    assert_eq!(failing.queries.lock().len(), 1);
}

#[tokio::test]
async fn outline_serializes_with_wire_names() {
    let outline = OutlineOrchestrator::offline()
        .generate(&params(), &blueprint())
        .await;
    let value = serde_json::to_value(&outline).unwrap();
    assert_eq!(value["mode"], "stub");
    assert_eq!(value["blueprintId"], "bp-bakery");
    assert_eq!(value["sections"][0]["type"], "hero");
    assert_eq!(value["sections"][0]["targetWords"], 150);
    assert!(value["generatedAt"].is_string());
    assert!(value.get("estimatedTimeMinutes").is_some());
}

#[tokio::test]
async fn loosely_typed_live_fields_keep_the_live_outline() {
    let reply = r#"{"sections":[{"heading":"Fresh","targetWords":"120"},{"heading":"Ovens","targetWords":250.0}]}"#;
    let generator = Arc::new(ScriptedGenerator::replying(reply));
    let outline = OutlineOrchestrator::new(generator, CostEstimator::default())
        .generate(&params(), &blueprint())
        .await;

    assert_eq!(outline.mode, OutlineMode::Hybrid);
    let headings: Vec<&str> = outline.sections.iter().map(|s| s.heading.as_str()).collect();
    assert_eq!(headings, vec!["Fresh", "Ovens"]);
    assert_eq!(outline.total_words, 370);
}

#[tokio::test]
async fn oversized_word_targets_never_abort_outline_generation() {
    let reply = r#"{"sections":[{"heading":"A","targetWords":4294967295},{"heading":"B","targetWords":4294967295}]}"#;
    let generator = Arc::new(ScriptedGenerator::replying(reply));
    let outline = OutlineOrchestrator::new(generator, CostEstimator::default())
        .generate(&params(), &blueprint())
        .await;
    assert_eq!(outline.mode, OutlineMode::Hybrid);
    assert_eq!(outline.total_words, u32::MAX);

    let huge = Blueprint::new(
        "bp-huge",
        vec![
            SectionTemplate::new("Everything", "content", u32::MAX),
            SectionTemplate::new("Footer", "cta", 10),
        ],
    );
    let outline = OutlineOrchestrator::offline().generate(&params(), &huge).await;
    assert_eq!(outline.mode, OutlineMode::Stub);
    assert_eq!(outline.total_words, u32::MAX);
}
