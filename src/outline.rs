//! Outline Orchestrator
//!
//! Plans a whole page as an ordered list of sections. Live mode asks the
//! generation service for the plan; stub mode derives it offline from the
//! blueprint. The live path returns a `Result`, and every failure variant is
//! mapped to the stub path, so [`OutlineOrchestrator::generate`] never fails.

use crate::blueprint::{needs_image, Blueprint, SectionTemplate, DEFAULT_WORD_TARGET};
use crate::cost::{CostEstimator, CostLedger};
use crate::error::ApiError;
use crate::prompt::OutlinePrompt;
use crate::provider::TextGenerator;
use crate::request::{ResolvedMode, DEFAULT_ALPHA};
use crate::retrieval::ContextRetriever;
use crate::types::ContextChunk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const WORDS_PER_MINUTE: u32 = 200;
const DEFAULT_SECTION_TYPE: &str = "content";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineParams {
    pub brief: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    /// Forces stub mode for this request
    #[serde(default)]
    pub development: bool,
}

fn default_audience() -> String {
    "general audience".to_string()
}

fn default_tone() -> String {
    "professional".to_string()
}

impl OutlineParams {
    pub fn new(brief: impl Into<String>) -> Self {
        Self {
            brief: brief.into(),
            audience: default_audience(),
            tone: default_tone(),
            development: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineMode {
    Stub,
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineSection {
    pub id: String,
    pub heading: String,
    #[serde(rename = "type")]
    pub section_type: String,
    pub target_words: u32,
    pub needs_image: bool,
    #[serde(default)]
    pub subheadings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineResult {
    pub sections: Vec<OutlineSection>,
    pub total_words: u32,
    pub estimated_time_minutes: u32,
    pub mode: OutlineMode,
    pub estimated_cost: f64,
    pub generated_at: DateTime<Utc>,
    pub blueprint_id: String,
}

impl OutlineResult {
    fn assemble(
        sections: Vec<OutlineSection>,
        mode: OutlineMode,
        estimated_cost: f64,
        blueprint: &Blueprint,
    ) -> Self {
        let total_words = sections
            .iter()
            .fold(0u32, |total, s| total.saturating_add(s.target_words));
        Self {
            total_words,
            estimated_time_minutes: estimated_minutes(total_words),
            sections,
            mode,
            estimated_cost: estimated_cost.max(0.0),
            generated_at: Utc::now(),
            blueprint_id: blueprint.id.clone(),
        }
    }
}

/// Reading/editing time at a fixed pace, at least one minute for non-empty outlines.
pub fn estimated_minutes(total_words: u32) -> u32 {
    if total_words == 0 {
        0
    } else {
        total_words.div_ceil(WORDS_PER_MINUTE).max(1)
    }
}

fn section_id(index: usize) -> String {
    format!("section-{}", index + 1)
}

/// Offline outline source. Must be deterministic and must not fail.
pub trait StubOutlineGenerator: Send + Sync {
    fn generate(&self, params: &OutlineParams, blueprint: &Blueprint) -> Vec<OutlineSection>;
}

/// Derives the outline directly from the blueprint's templates.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlueprintStubGenerator;

impl BlueprintStubGenerator {
    fn default_templates() -> Vec<SectionTemplate> {
        vec![
            SectionTemplate::new("Welcome", "hero", 120),
            SectionTemplate::new("What we offer", "content", DEFAULT_WORD_TARGET),
            SectionTemplate::new("Get in touch", "cta", 80),
        ]
    }

    fn subheadings_for(section_type: &str) -> Vec<String> {
        let suggestions: &[&str] = match section_type {
            "content" => &["Overview", "Key details"],
            "feature" | "features" => &["Highlights", "How it works"],
            "faq" => &["Common questions"],
            "pricing" => &["Plans", "What's included"],
            _ => &[],
        };
        suggestions.iter().map(|s| s.to_string()).collect()
    }
}

impl StubOutlineGenerator for BlueprintStubGenerator {
    fn generate(&self, _params: &OutlineParams, blueprint: &Blueprint) -> Vec<OutlineSection> {
        let fallback;
        let templates = if blueprint.sections.is_empty() {
            fallback = Self::default_templates();
            &fallback
        } else {
            &blueprint.sections
        };

        templates
            .iter()
            .enumerate()
            .map(|(index, template)| {
                let mut section = section_from_template(index, template);
                section.subheadings = Self::subheadings_for(&section.section_type);
                section
            })
            .collect()
    }
}

fn section_from_template(index: usize, template: &SectionTemplate) -> OutlineSection {
    let section_type = non_empty(&template.section_type)
        .unwrap_or(DEFAULT_SECTION_TYPE)
        .to_ascii_lowercase();
    let heading = non_empty(&template.heading)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Section {}", index + 1));
    OutlineSection {
        id: section_id(index),
        heading,
        needs_image: needs_image(None, Some(template), &section_type),
        section_type,
        target_words: template.effective_word_target(),
        subheadings: Vec::new(),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Shape the generation service is asked to answer with. Every field is
/// optional; absent fields fall back to the blueprint.
#[derive(Debug, Default, Deserialize)]
struct LiveOutline {
    #[serde(default)]
    sections: Vec<LiveSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveSection {
    #[serde(default, alias = "title", deserialize_with = "lenient_string")]
    heading: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    section_type: Option<String>,
    #[serde(
        default,
        alias = "wordTarget",
        alias = "target_words",
        deserialize_with = "lenient_words"
    )]
    target_words: Option<u32>,
    #[serde(default, alias = "needs_image", deserialize_with = "lenient_bool")]
    needs_image: Option<bool>,
    #[serde(default, deserialize_with = "lenient_strings")]
    subheadings: Option<Vec<String>>,
}

// Field parsers below never fail: a malformed value reads as absent so the
// template fallback applies to that field alone.

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        Value::String(text) => Some(text),
        _ => None,
    }))
}

/// Accepts integers, floats and numeric strings; rounds to whole words.
fn lenient_words<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    let words = match raw {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    // `as` saturates at u32::MAX for oversized values.
    Ok(words
        .filter(|w| w.is_finite() && *w >= 0.0)
        .map(|w| w.round() as u32))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Bool(flag)) => Some(flag),
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Reshape a live response into outline sections.
///
/// The JSON object may be wrapped in prose or code fences. A response with no
/// sections yields the blueprint's own sections; partial responses are not
/// padded.
pub fn parse_outline_response(
    response: &str,
    blueprint: &Blueprint,
) -> Result<Vec<OutlineSection>, ApiError> {
    let start = response.find('{');
    let end = response.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => {
            return Err(ApiError::GenerationFailed(
                "Outline response contained no JSON object".to_string(),
            ))
        }
    };

    let live: LiveOutline = serde_json::from_str(json).map_err(|e| {
        ApiError::GenerationFailed(format!("Outline response was not valid JSON: {}", e))
    })?;

    if live.sections.is_empty() {
        debug!(blueprint_id = %blueprint.id, "Live outline had no sections, using blueprint");
        return Ok(blueprint
            .sections
            .iter()
            .enumerate()
            .map(|(index, template)| section_from_template(index, template))
            .collect());
    }

    Ok(live
        .sections
        .into_iter()
        .enumerate()
        .map(|(index, live)| merge_section(index, live, blueprint.section(index)))
        .collect())
}

fn merge_section(index: usize, live: LiveSection, template: Option<&SectionTemplate>) -> OutlineSection {
    let section_type = live
        .section_type
        .as_deref()
        .and_then(non_empty)
        .or_else(|| template.and_then(|t| non_empty(&t.section_type)))
        .unwrap_or(DEFAULT_SECTION_TYPE)
        .to_ascii_lowercase();

    let heading = live
        .heading
        .as_deref()
        .and_then(non_empty)
        .or_else(|| template.and_then(|t| non_empty(&t.heading)))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Section {}", index + 1));

    let target_words = live
        .target_words
        .filter(|words| *words > 0)
        .or_else(|| template.map(SectionTemplate::effective_word_target))
        .unwrap_or(DEFAULT_WORD_TARGET);

    let subheadings = live
        .subheadings
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    OutlineSection {
        id: section_id(index),
        heading,
        needs_image: needs_image(live.needs_image, template, &section_type),
        section_type,
        target_words,
        subheadings,
    }
}

pub struct OutlineOrchestrator {
    generator: Option<Arc<dyn TextGenerator>>,
    stub: Arc<dyn StubOutlineGenerator>,
    retriever: Option<Arc<ContextRetriever>>,
    estimator: CostEstimator,
    ledger: Option<Arc<dyn CostLedger>>,
    stub_mode: bool,
}

impl OutlineOrchestrator {
    /// Orchestrator with no live backend; every outline comes from the stub.
    pub fn offline() -> Self {
        Self {
            generator: None,
            stub: Arc::new(BlueprintStubGenerator),
            retriever: None,
            estimator: CostEstimator::default(),
            ledger: None,
            stub_mode: true,
        }
    }

    pub fn new(generator: Arc<dyn TextGenerator>, estimator: CostEstimator) -> Self {
        Self {
            generator: Some(generator),
            estimator,
            stub_mode: false,
            ..Self::offline()
        }
    }

    pub fn with_stub(mut self, stub: Arc<dyn StubOutlineGenerator>) -> Self {
        self.stub = stub;
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<ContextRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn CostLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Configuration switch forcing stub mode for every request.
    pub fn with_stub_mode(mut self, stub_mode: bool) -> Self {
        self.stub_mode = stub_mode;
        self
    }

    /// Decide the mode before any expensive work starts.
    pub fn resolve_mode(&self, params: &OutlineParams) -> ResolvedMode {
        if params.development || self.stub_mode || self.generator.is_none() {
            ResolvedMode::Stub
        } else {
            ResolvedMode::Hybrid {
                alpha: DEFAULT_ALPHA,
            }
        }
    }

    pub async fn generate(&self, params: &OutlineParams, blueprint: &Blueprint) -> OutlineResult {
        let mode = self.resolve_mode(params);
        if mode == ResolvedMode::Stub {
            return self.stub_outline(params, blueprint);
        }

        match self.generate_live(params, blueprint, &mode).await {
            Ok(outline) => outline,
            Err(e) => {
                warn!(
                    blueprint_id = %blueprint.id,
                    error = %e,
                    "Live outline generation failed, falling back to stub"
                );
                self.stub_outline(params, blueprint)
            }
        }
    }

    fn stub_outline(&self, params: &OutlineParams, blueprint: &Blueprint) -> OutlineResult {
        let sections = self.stub.generate(params, blueprint);
        info!(
            blueprint_id = %blueprint.id,
            sections = sections.len(),
            "Generated stub outline"
        );
        OutlineResult::assemble(sections, OutlineMode::Stub, 0.0, blueprint)
    }

    async fn generate_live(
        &self,
        params: &OutlineParams,
        blueprint: &Blueprint,
        mode: &ResolvedMode,
    ) -> Result<OutlineResult, ApiError> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            ApiError::GenerationFailed("No generation service configured".to_string())
        })?;

        let chunks = self.retrieve_context(&params.brief).await;
        let prompt = OutlinePrompt {
            brief: &params.brief,
            audience: &params.audience,
            tone: &params.tone,
            blueprint,
            chunks: &chunks,
        }
        .render();

        let output = generator.generate(&prompt, mode, None).await?;
        let sections = parse_outline_response(&output.content, blueprint)?;

        let cost = self
            .estimator
            .estimate_text(generator.service_name(), &prompt, &output.content);
        if let Some(ledger) = &self.ledger {
            ledger.add(cost);
        }

        info!(
            blueprint_id = %blueprint.id,
            sections = sections.len(),
            cost_usd = cost,
            "Generated live outline"
        );
        Ok(OutlineResult::assemble(
            sections,
            OutlineMode::Hybrid,
            cost,
            blueprint,
        ))
    }

    async fn retrieve_context(&self, brief: &str) -> Vec<ContextChunk> {
        let Some(retriever) = &self.retriever else {
            return Vec::new();
        };
        if retriever.namespaces().is_empty() {
            return Vec::new();
        }
        match retriever.retrieve(brief).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(error = %e, "Outline context retrieval failed, continuing without it");
                Vec::new()
            }
        }
    }
}
