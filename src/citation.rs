//! Citation extraction
//!
//! Correlates generated text with the chunks used to ground it. A chunk is
//! cited when some sentence of the generated text shares enough content words
//! with it; the best-matching sentence becomes the cited span. Citations come
//! out in chunk order, and only chunks from the input list are ever cited.

use crate::blocks::escape_html;
use crate::request::{CitationFormat, CitationSettings, CitationStyle};
use crate::types::{ChunkReference, Citation, ContextChunk};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static SENTENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?\n]+[.!?]*").expect("valid sentence regex"));

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "been", "before", "being", "both", "could", "does", "each", "from",
    "have", "into", "just", "like", "made", "many", "more", "most", "much", "only", "other",
    "over", "same", "some", "such", "than", "that", "their", "them", "then", "there", "these",
    "they", "this", "those", "very", "were", "what", "when", "where", "which", "while", "will",
    "with", "would", "your", "ours",
];

fn content_words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 4)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

pub struct CitationExtractor {
    /// Minimum shared content words between a sentence and a chunk
    min_shared: usize,
    /// Minimum fraction of the sentence's content words found in the chunk
    min_overlap: f64,
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self {
            min_shared: 3,
            min_overlap: 0.4,
        }
    }
}

impl CitationExtractor {
    pub fn new(min_shared: usize, min_overlap: f64) -> Self {
        Self {
            min_shared: min_shared.max(1),
            min_overlap: min_overlap.clamp(0.0, 1.0),
        }
    }

    pub fn extract(
        &self,
        generated: &str,
        chunks: &[ContextChunk],
        settings: &CitationSettings,
    ) -> Vec<Citation> {
        if !settings.enabled || chunks.is_empty() {
            return Vec::new();
        }

        let sentences: Vec<(&str, BTreeSet<String>)> = SENTENCE_PATTERN
            .find_iter(generated)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(|s| (s, content_words(s)))
            .filter(|(_, words)| !words.is_empty())
            .collect();

        let mut citations = Vec::new();
        for (rank, chunk) in chunks.iter().enumerate() {
            let chunk_words = content_words(&chunk.text);
            let best = sentences
                .iter()
                .map(|(sentence, words)| {
                    let shared = words.intersection(&chunk_words).count();
                    (*sentence, shared, shared as f64 / words.len() as f64)
                })
                .filter(|(_, shared, ratio)| *shared >= self.min_shared && *ratio >= self.min_overlap)
                .max_by(|a, b| a.1.cmp(&b.1).then(a.2.total_cmp(&b.2)));

            if let Some((sentence, _, _)) = best {
                let number = citations.len() + 1;
                citations.push(Citation {
                    text: sentence.to_string(),
                    source: chunk.source_id.clone(),
                    attribution: attribution_text(number, chunk, settings),
                    reference: settings.include_mvdb_refs.then(|| ChunkReference {
                        source_id: chunk.source_id.clone(),
                        score: chunk.score,
                        rank,
                    }),
                });
            }
        }
        citations
    }
}

fn attribution_text(number: usize, chunk: &ContextChunk, settings: &CitationSettings) -> String {
    let label = chunk.attribution_label();
    let url = chunk.url.as_deref();
    match (settings.style, settings.format) {
        (CitationStyle::Inline, CitationFormat::Text) => match url {
            Some(url) => format!("[{}] {} ({})", number, label, url),
            None => format!("[{}] {}", number, label),
        },
        (CitationStyle::Inline, CitationFormat::Markdown) => match url {
            Some(url) => format!("[{}] [{}]({})", number, label, url),
            None => format!("[{}] {}", number, label),
        },
        (CitationStyle::Inline, CitationFormat::Html) => match url {
            Some(url) => format!(
                "<cite>[{}] <a href=\"{}\">{}</a></cite>",
                number,
                escape_html(url),
                escape_html(label)
            ),
            None => format!("<cite>[{}] {}</cite>", number, escape_html(label)),
        },
        (CitationStyle::Footnote, CitationFormat::Text) => match url {
            Some(url) => format!("{}. {} ({})", number, label, url),
            None => format!("{}. {}", number, label),
        },
        (CitationStyle::Footnote, CitationFormat::Markdown) => match url {
            Some(url) => format!("[^{}]: {} <{}>", number, label, url),
            None => format!("[^{}]: {}", number, label),
        },
        (CitationStyle::Footnote, CitationFormat::Html) => match url {
            Some(url) => format!(
                "<li id=\"cite-{}\"><a href=\"{}\">{}</a></li>",
                number,
                escape_html(url),
                escape_html(label)
            ),
            None => format!("<li id=\"cite-{}\">{}</li>", number, escape_html(label)),
        },
    }
}
