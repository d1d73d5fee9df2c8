//! Image pipeline capability and the decision of when to use it.

use crate::error::ApiError;
use crate::prompt::truncate_words;
use crate::request::{ImagePolicy, ImageRequirements};
use crate::types::MediaAsset;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Section types that get an image under the `optional` policy.
const IMAGE_PRONE_TYPES: &[&str] = &["hero", "feature", "testimonial"];
const PROMPT_BRIEF_WORDS: usize = 30;
const ALT_TEXT_MAX_CHARS: usize = 125;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    pub prompt: String,
    pub style: String,
    pub source: String,
    pub alt_text: String,
    pub license_filter: Vec<String>,
}

/// Image acquisition capability (generation, stock search, upload)
#[async_trait]
pub trait ImagePipeline: Send + Sync {
    async fn request(&self, request: &ImageRequest) -> Result<MediaAsset, ApiError>;
}

/// `none` never, `required` always, `optional` only for image-prone section types.
pub fn should_request_image(policy: ImagePolicy, section_type: &str) -> bool {
    match policy {
        ImagePolicy::None => false,
        ImagePolicy::Required => true,
        ImagePolicy::Optional => {
            IMAGE_PRONE_TYPES.contains(&section_type.to_ascii_lowercase().as_str())
        }
    }
}

fn alt_text_for(brief: &str) -> String {
    let brief = brief.trim();
    let first_sentence = brief
        .split_terminator(['.', '!', '?', '\n'])
        .next()
        .unwrap_or(brief)
        .trim();
    if first_sentence.chars().count() <= ALT_TEXT_MAX_CHARS {
        first_sentence.to_string()
    } else {
        let cut: String = first_sentence.chars().take(ALT_TEXT_MAX_CHARS - 3).collect();
        format!("{}...", cut.trim_end())
    }
}

pub fn build_image_request(
    brief: &str,
    section_type: &str,
    requirements: &ImageRequirements,
) -> ImageRequest {
    ImageRequest {
        prompt: format!(
            "{} image for a {} section: {}",
            requirements.style,
            section_type,
            truncate_words(brief, PROMPT_BRIEF_WORDS)
        ),
        style: requirements.style.clone(),
        source: requirements.source.clone(),
        alt_text: alt_text_for(brief),
        license_filter: requirements.license_filter.clone(),
    }
}
