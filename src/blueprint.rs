//! Blueprints: read-only structural templates for a page.

use serde::{Deserialize, Serialize};

pub const DEFAULT_WORD_TARGET: u32 = 300;

/// Section types that want an image when nothing else decides.
const IMAGE_DEFAULT_TYPES: &[&str] = &["hero", "testimonial", "team", "pricing"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPolicy {
    Required,
    Optional,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTemplate {
    pub heading: String,
    #[serde(rename = "type")]
    pub section_type: String,
    #[serde(default = "default_word_target")]
    pub word_target: u32,
    #[serde(default)]
    pub media_policy: Option<MediaPolicy>,
}

fn default_word_target() -> u32 {
    DEFAULT_WORD_TARGET
}

impl SectionTemplate {
    pub fn new(heading: impl Into<String>, section_type: impl Into<String>, word_target: u32) -> Self {
        Self {
            heading: heading.into(),
            section_type: section_type.into(),
            word_target,
            media_policy: None,
        }
    }

    pub fn with_media_policy(mut self, policy: MediaPolicy) -> Self {
        self.media_policy = Some(policy);
        self
    }

    /// Word target guaranteed to be positive.
    pub fn effective_word_target(&self) -> u32 {
        if self.word_target == 0 {
            DEFAULT_WORD_TARGET
        } else {
            self.word_target
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionTemplate>,
}

impl Blueprint {
    pub fn new(id: impl Into<String>, sections: Vec<SectionTemplate>) -> Self {
        Self {
            id: id.into(),
            name: None,
            sections,
        }
    }

    pub fn section(&self, index: usize) -> Option<&SectionTemplate> {
        self.sections.get(index)
    }
}

/// Decide whether an outline section needs an image.
///
/// An explicit signal from the generation service wins, then a decisive media
/// policy on the template (`required` / `none`), then the section-type defaults.
pub fn needs_image(
    explicit: Option<bool>,
    template: Option<&SectionTemplate>,
    section_type: &str,
) -> bool {
    if let Some(flag) = explicit {
        return flag;
    }
    match template.and_then(|t| t.media_policy) {
        Some(MediaPolicy::Required) => true,
        Some(MediaPolicy::None) => false,
        Some(MediaPolicy::Optional) | None => {
            IMAGE_DEFAULT_TYPES.contains(&section_type.to_ascii_lowercase().as_str())
        }
    }
}
