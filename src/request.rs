//! Section generation requests
//!
//! Request shape accepted by the section orchestrator, plus the mode resolution
//! that turns loosely-typed caller input into a [`ResolvedMode`] once per request.

use crate::error::ApiError;
use crate::types::BlockFamily;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const MIN_BRIEF_CHARS: usize = 10;
pub const DEFAULT_ALPHA: f64 = 0.5;

/// Generation mode requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Grounded,
    #[default]
    Hybrid,
    Generative,
}

impl GenerationMode {
    /// Parse a mode name; anything unrecognized becomes `Hybrid`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "grounded" => GenerationMode::Grounded,
            "generative" => GenerationMode::Generative,
            _ => GenerationMode::Hybrid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Grounded => "grounded",
            GenerationMode::Hybrid => "hybrid",
            GenerationMode::Generative => "generative",
        }
    }
}

fn lenient_mode<'de, D>(deserializer: D) -> Result<GenerationMode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map(GenerationMode::parse_lenient)
        .unwrap_or_default())
}

fn lenient_alpha<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(DEFAULT_ALPHA))
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

/// Clamp alpha into [0, 1]; NaN falls back to the default weight.
pub fn clamp_alpha(alpha: f64) -> f64 {
    if alpha.is_nan() {
        DEFAULT_ALPHA
    } else {
        alpha.clamp(0.0, 1.0)
    }
}

/// Mode resolved once at the orchestrator boundary. Only `Hybrid` carries a weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedMode {
    Stub,
    Grounded,
    Hybrid { alpha: f64 },
    Generative,
}

impl ResolvedMode {
    pub fn from_request(mode: GenerationMode, alpha: f64) -> Self {
        match mode {
            GenerationMode::Grounded => ResolvedMode::Grounded,
            GenerationMode::Hybrid => ResolvedMode::Hybrid {
                alpha: clamp_alpha(alpha),
            },
            GenerationMode::Generative => ResolvedMode::Generative,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResolvedMode::Stub => "stub",
            ResolvedMode::Grounded => "grounded",
            ResolvedMode::Hybrid { .. } => "hybrid",
            ResolvedMode::Generative => "generative",
        }
    }

    pub fn alpha(&self) -> Option<f64> {
        match self {
            ResolvedMode::Hybrid { alpha } => Some(*alpha),
            _ => None,
        }
    }

    /// Whether this mode grounds generation in retrieved context.
    pub fn uses_retrieval(&self) -> bool {
        matches!(self, ResolvedMode::Grounded | ResolvedMode::Hybrid { .. })
    }
}

/// Desired output-block family and the chain to fall back through
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPreferences {
    #[serde(default = "default_family")]
    pub preferred_family: BlockFamily,
    #[serde(default)]
    pub fallback_chain: Vec<BlockFamily>,
    #[serde(default = "default_section_type")]
    pub section_type: String,
    /// Explicit block name; when absent the family default is used
    #[serde(default)]
    pub block_name: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

fn default_family() -> BlockFamily {
    BlockFamily::Core
}

fn default_section_type() -> String {
    "content".to_string()
}

impl Default for BlockPreferences {
    fn default() -> Self {
        Self {
            preferred_family: default_family(),
            fallback_chain: Vec::new(),
            section_type: default_section_type(),
            block_name: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// When an image should be requested for a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePolicy {
    None,
    #[default]
    Optional,
    Required,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequirements {
    #[serde(default)]
    pub policy: ImagePolicy,
    #[serde(default = "default_image_style")]
    pub style: String,
    #[serde(default = "default_image_source")]
    pub source: String,
    #[serde(default)]
    pub license_filter: Vec<String>,
}

fn default_image_style() -> String {
    "photographic".to_string()
}

fn default_image_source() -> String {
    "ai".to_string()
}

impl Default for ImageRequirements {
    fn default() -> Self {
        Self {
            policy: ImagePolicy::default(),
            style: default_image_style(),
            source: default_image_source(),
            license_filter: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    #[default]
    Inline,
    Footnote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationFormat {
    #[default]
    Text,
    Markdown,
    Html,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Attach vector-store references (source id, score, rank) to each citation
    #[serde(default)]
    pub include_mvdb_refs: bool,
    #[serde(default)]
    pub style: CitationStyle,
    #[serde(default)]
    pub format: CitationFormat,
}

fn default_true() -> bool {
    true
}

impl Default for CitationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            include_mvdb_refs: false,
            style: CitationStyle::default(),
            format: CitationFormat::default(),
        }
    }
}

/// Per-section generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub section_id: String,
    pub content_brief: String,
    #[serde(default, deserialize_with = "lenient_mode")]
    pub mode: GenerationMode,
    #[serde(default = "default_alpha", deserialize_with = "lenient_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub block_preferences: BlockPreferences,
    #[serde(default)]
    pub image_requirements: ImageRequirements,
    #[serde(default)]
    pub citation_settings: CitationSettings,
}

impl GenerationRequest {
    pub fn new(section_id: impl Into<String>, content_brief: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            content_brief: content_brief.into(),
            mode: GenerationMode::default(),
            alpha: DEFAULT_ALPHA,
            block_preferences: BlockPreferences::default(),
            image_requirements: ImageRequirements::default(),
            citation_settings: CitationSettings::default(),
        }
    }

    /// Reject malformed requests before any network call is made.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.section_id.trim().is_empty() {
            return Err(ApiError::Validation(
                "sectionId cannot be empty".to_string(),
            ));
        }
        let brief_len = self.content_brief.trim().chars().count();
        if brief_len < MIN_BRIEF_CHARS {
            return Err(ApiError::Validation(format!(
                "contentBrief must be at least {} characters, got {}",
                MIN_BRIEF_CHARS, brief_len
            )));
        }
        if self.block_preferences.section_type.trim().is_empty() {
            return Err(ApiError::Validation(
                "blockPreferences.sectionType cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn clamped_alpha(&self) -> f64 {
        clamp_alpha(self.alpha)
    }

    /// Validate and resolve the generation mode for this request.
    pub fn resolve_mode(&self) -> Result<ResolvedMode, ApiError> {
        self.validate()?;
        Ok(ResolvedMode::from_request(self.mode, self.alpha))
    }
}
