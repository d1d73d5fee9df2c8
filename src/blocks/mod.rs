//! Block conversion
//!
//! Turns raw generated text into a typed block tree for the resolved block
//! family, and renders that tree to markup. Family-specific attribute
//! conventions live in [`family`] strategies; the converter only looks them up
//! by family, so a new family is a new [`FamilyFormatter`] registration.

pub mod family;
pub mod render;
pub mod resolve;

pub use family::{
    CoreFormatter, FamilyFormatter, GenerateBlocksFormatter, GenericFormatter, KadenceFormatter,
};
pub use render::{count_words, escape_html, strip_tags, MarkupRenderer};
pub use resolve::{BlockResolver, PreferenceResolver};

use crate::error::ApiError;
use crate::types::{BlockFamily, BlockSpecification};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::warn;

/// Length of the hex block id derived from the section id.
const UNIQUE_ID_LEN: usize = 12;

/// One node of the output block tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockNode {
    pub block_name: String,
    pub attrs: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub inner_blocks: Vec<BlockNode>,
}

impl BlockNode {
    pub fn content(&self) -> &str {
        self.attrs
            .get("content")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
    }

    pub fn set_attr(&mut self, key: &str, value: serde_json::Value) {
        self.attrs.insert(key.to_string(), value);
    }
}

/// Deterministic block id: leading hex of BLAKE3(section_id, block_name).
pub fn unique_block_id(section_id: &str, block_name: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(section_id.as_bytes());
    hasher.update(&[0u8]);
    hasher.update(block_name.as_bytes());
    let digest = hex::encode(hasher.finalize().as_bytes());
    digest[..UNIQUE_ID_LEN].to_string()
}

/// Converts generated text into block trees and renders them.
pub struct BlockConverter {
    formatters: HashMap<BlockFamily, Arc<dyn FamilyFormatter>>,
    fallback: Arc<dyn FamilyFormatter>,
    renderer: Option<Arc<dyn MarkupRenderer>>,
}

impl Default for BlockConverter {
    fn default() -> Self {
        let mut converter = Self {
            formatters: HashMap::new(),
            fallback: Arc::new(GenericFormatter),
            renderer: None,
        };
        converter.register(Arc::new(KadenceFormatter));
        converter.register(Arc::new(GenerateBlocksFormatter));
        converter.register(Arc::new(CoreFormatter));
        converter
    }
}

impl BlockConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the host's block renderer instead of the built-in wrapper.
    pub fn with_renderer(mut self, renderer: Arc<dyn MarkupRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn register(&mut self, formatter: Arc<dyn FamilyFormatter>) {
        self.formatters.insert(formatter.family(), formatter);
    }

    fn formatter(&self, family: &BlockFamily) -> &dyn FamilyFormatter {
        self.formatters
            .get(family)
            .map(|f| &**f)
            .unwrap_or(&*self.fallback)
    }

    /// Build the block tree for one section.
    pub fn convert(
        &self,
        section_id: &str,
        content: &str,
        spec: &BlockSpecification,
    ) -> Result<BlockNode, ApiError> {
        let block_name = spec.block_name.trim();
        if block_name.is_empty() || !block_name.contains('/') {
            return Err(ApiError::Conversion(format!(
                "Invalid block name '{}' for section {}",
                spec.block_name, section_id
            )));
        }

        let mut attrs = spec.attributes.clone();
        attrs.insert(
            "uniqueId".to_string(),
            serde_json::Value::String(unique_block_id(section_id, block_name)),
        );
        attrs.insert(
            "content".to_string(),
            serde_json::Value::String(content.trim().to_string()),
        );

        let mut node = BlockNode {
            block_name: block_name.to_string(),
            attrs,
            inner_blocks: Vec::new(),
        };
        self.formatter(&spec.family())
            .apply_overlay(&spec.section_type.to_ascii_lowercase(), &mut node);
        Ok(node)
    }

    /// Render a block tree to markup, preferring the host renderer.
    pub fn render(&self, node: &BlockNode, spec: &BlockSpecification) -> String {
        if let Some(renderer) = &self.renderer {
            match renderer.render(node) {
                Ok(markup) => return markup,
                Err(e) => warn!(
                    block = %node.block_name,
                    error = %e,
                    "Host block renderer failed, using built-in wrapper"
                ),
            }
        }
        let class = self.formatter(&spec.family()).wrapper_class(node);
        render::fallback_markup(&class, node.content())
    }
}
