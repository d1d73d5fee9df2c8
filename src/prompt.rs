//! Prompt assembly
//!
//! Deterministic, side-effect free. Section prompts are built in a fixed order:
//! header, brief, grounding chunks, block requirements, mode, alpha (hybrid
//! only), closing instruction. Prompt-compatibility tests depend on this order
//! and on the chunk truncation below.

use crate::blueprint::{needs_image, Blueprint};
use crate::request::ResolvedMode;
use crate::types::{BlockSpecification, ContextChunk};

/// At most this many chunks are included in a prompt.
pub const MAX_PROMPT_CHUNKS: usize = 5;
/// Each chunk is cut to roughly this many words.
pub const CHUNK_WORD_LIMIT: usize = 50;

const SECTION_CLOSING: &str =
    "Write the section content as plain prose paragraphs that satisfy the block requirements. Do not include markup.";

const OUTLINE_RESPONSE_FORMAT: &str = r#"Respond with JSON only, in the form {"sections":[{"heading":"...","type":"...","targetWords":300,"needsImage":false,"subheadings":["..."]}]}."#;

/// Keep the first `limit` whitespace-separated words, marking truncation with "...".
pub fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        words.join(" ")
    } else {
        format!("{}...", words[..limit].join(" "))
    }
}

fn render_chunks(chunks: &[ContextChunk]) -> Option<String> {
    if chunks.is_empty() {
        return None;
    }
    let mut lines = vec!["Reference context:".to_string()];
    for (index, chunk) in chunks.iter().take(MAX_PROMPT_CHUNKS).enumerate() {
        lines.push(format!(
            "[{}] {}",
            index + 1,
            truncate_words(&chunk.text, CHUNK_WORD_LIMIT)
        ));
    }
    Some(lines.join("\n"))
}

/// Prompt for generating one section's content
pub struct SectionPrompt<'a> {
    pub brief: &'a str,
    pub block: &'a BlockSpecification,
    pub mode: &'a ResolvedMode,
    pub chunks: &'a [ContextChunk],
}

impl SectionPrompt<'_> {
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(7);

        parts.push(format!(
            "Section type: {} | Target block: {}",
            self.block.section_type, self.block.block_name
        ));
        parts.push(format!("Content brief: {}", self.brief.trim()));

        if let Some(context) = render_chunks(self.chunks) {
            parts.push(context);
        }

        let required: Vec<&str> = self.block.attributes.keys().map(String::as_str).collect();
        let required = if required.is_empty() {
            "none".to_string()
        } else {
            required.join(", ")
        };
        parts.push(format!(
            "Block requirements:\n- Block name: {}\n- Plugin: {}\n- Section type: {}\n- Required attributes: {}",
            self.block.block_name, self.block.plugin, self.block.section_type, required
        ));

        parts.push(format!("Generation mode: {}", self.mode.name()));
        if let Some(alpha) = self.mode.alpha() {
            parts.push(format!("Context weight (alpha): {:.2}", alpha));
        }

        parts.push(SECTION_CLOSING.to_string());
        parts.join("\n\n")
    }
}

/// Prompt for generating a whole-page outline from a blueprint
pub struct OutlinePrompt<'a> {
    pub brief: &'a str,
    pub audience: &'a str,
    pub tone: &'a str,
    pub blueprint: &'a Blueprint,
    pub chunks: &'a [ContextChunk],
}

impl OutlinePrompt<'_> {
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(6);

        parts.push("Create a page outline for the following brief.".to_string());
        parts.push(format!(
            "Brief: {}\nAudience: {}\nTone: {}",
            self.brief.trim(),
            self.audience,
            self.tone
        ));

        let mut sections = vec!["Blueprint sections:".to_string()];
        for (index, template) in self.blueprint.sections.iter().enumerate() {
            let images = if needs_image(None, Some(template), &template.section_type) {
                "with images"
            } else {
                "without images"
            };
            sections.push(format!(
                "{}. {} ({}, {} words, {})",
                index + 1,
                template.heading,
                template.section_type,
                template.effective_word_target(),
                images
            ));
        }
        parts.push(sections.join("\n"));

        if let Some(context) = render_chunks(self.chunks) {
            parts.push(context);
        }

        parts.push(OUTLINE_RESPONSE_FORMAT.to_string());
        parts.join("\n\n")
    }
}
