//! Markup rendering helpers and the host renderer capability.

use crate::blocks::BlockNode;
use crate::error::ApiError;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Host block-rendering capability. Optional; the converter has a built-in fallback.
pub trait MarkupRenderer: Send + Sync {
    fn render(&self, node: &BlockNode) -> Result<String, ApiError>;
}

/// Escape text for safe embedding in HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub(crate) fn fallback_markup(class: &str, content: &str) -> String {
    format!(
        "<div class=\"{}\">{}</div>",
        escape_html(class),
        escape_html(content)
    )
}

/// Remove markup tags, leaving a space where each tag was.
pub fn strip_tags(markup: &str) -> String {
    TAG_PATTERN.replace_all(markup, " ").into_owned()
}

/// Words in rendered markup once tags are stripped.
pub fn count_words(markup: &str) -> usize {
    strip_tags(markup).split_whitespace().count()
}
