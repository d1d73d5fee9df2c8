//! Core value types shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scored passage returned by the vector search service.
///
/// Chunks are immutable once returned and keep the retrieval service's
/// descending-score order for the rest of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextChunk {
    pub text: String,
    /// Relevance in [0, 1]
    pub score: f64,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ContextChunk {
    pub fn new(text: impl Into<String>, score: f64, source_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            score,
            source_id: source_id.into(),
            source_title: None,
            url: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Human-readable label for attribution: title when present, else source id.
    pub fn attribution_label(&self) -> &str {
        self.source_title.as_deref().unwrap_or(&self.source_id)
    }
}

/// Target output-component family
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockFamily {
    Kadence,
    GenerateBlocks,
    Core,
    /// Any other namespace; gets the base block tree only
    Generic(String),
}

impl BlockFamily {
    pub fn from_plugin(plugin: &str) -> Self {
        match plugin.trim().to_ascii_lowercase().as_str() {
            "kadence" | "kadence-blocks" => BlockFamily::Kadence,
            "generateblocks" | "generate-blocks" => BlockFamily::GenerateBlocks,
            "core" | "" => BlockFamily::Core,
            other => BlockFamily::Generic(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BlockFamily::Kadence => "kadence",
            BlockFamily::GenerateBlocks => "generateblocks",
            BlockFamily::Core => "core",
            BlockFamily::Generic(name) => name,
        }
    }

    /// Block namespace used in `namespace/name` block identifiers.
    pub fn namespace(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for BlockFamily {
    fn from(value: String) -> Self {
        BlockFamily::from_plugin(&value)
    }
}

impl From<BlockFamily> for String {
    fn from(value: BlockFamily) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for BlockFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved target block for one section. Immutable input to the converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSpecification {
    pub block_name: String,
    pub plugin: String,
    pub namespace: String,
    pub section_type: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub fallback_used: bool,
}

impl BlockSpecification {
    pub fn family(&self) -> BlockFamily {
        BlockFamily::from_plugin(&self.plugin)
    }
}

/// Reference back to the vector store entry a citation came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkReference {
    pub source_id: String,
    pub score: f64,
    /// Position of the chunk in the retrieval result list
    pub rank: usize,
}

/// Attribution tying a span of generated text to a source chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub text: String,
    pub source: String,
    pub attribution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ChunkReference>,
}

/// Image attached to a generated section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: String,
    pub url: String,
    pub alt_text: String,
    pub license: String,
    pub width: u32,
    pub height: u32,
    pub cost_usd: f64,
}
