//! Block resolution: caller preferences to a concrete [`BlockSpecification`].

use crate::error::ApiError;
use crate::request::BlockPreferences;
use crate::types::{BlockFamily, BlockSpecification};
use tracing::debug;

pub trait BlockResolver: Send + Sync {
    fn resolve(&self, preferences: &BlockPreferences) -> Result<BlockSpecification, ApiError>;
}

/// Default container block for a family.
pub fn default_block_name(family: &BlockFamily) -> String {
    match family {
        BlockFamily::Kadence => "kadence/rowlayout".to_string(),
        BlockFamily::GenerateBlocks => "generateblocks/container".to_string(),
        BlockFamily::Core => "core/group".to_string(),
        BlockFamily::Generic(namespace) => format!("{}/section", namespace),
    }
}

/// Picks the preferred family when installed, else the first installed family
/// in the fallback chain, else core.
pub struct PreferenceResolver {
    installed: Vec<BlockFamily>,
}

impl Default for PreferenceResolver {
    fn default() -> Self {
        Self::new(vec![
            BlockFamily::Kadence,
            BlockFamily::GenerateBlocks,
            BlockFamily::Core,
        ])
    }
}

impl PreferenceResolver {
    pub fn new(installed: Vec<BlockFamily>) -> Self {
        Self { installed }
    }

    fn is_installed(&self, family: &BlockFamily) -> bool {
        *family == BlockFamily::Core || self.installed.contains(family)
    }
}

impl BlockResolver for PreferenceResolver {
    fn resolve(&self, preferences: &BlockPreferences) -> Result<BlockSpecification, ApiError> {
        let section_type = preferences.section_type.trim();
        if section_type.is_empty() {
            return Err(ApiError::Validation(
                "Block preferences must name a section type".to_string(),
            ));
        }

        let preferred = &preferences.preferred_family;
        let chosen = if self.is_installed(preferred) {
            preferred.clone()
        } else {
            preferences
                .fallback_chain
                .iter()
                .find(|family| self.is_installed(family))
                .cloned()
                .unwrap_or(BlockFamily::Core)
        };
        let fallback_used = chosen != *preferred;

        let block_name = match (&preferences.block_name, fallback_used) {
            (Some(name), false) if !name.trim().is_empty() => name.trim().to_string(),
            _ => default_block_name(&chosen),
        };

        if fallback_used {
            debug!(
                preferred = %preferred,
                chosen = %chosen,
                "Preferred block family unavailable, using fallback"
            );
        }

        Ok(BlockSpecification {
            block_name,
            plugin: chosen.as_str().to_string(),
            namespace: chosen.namespace().to_string(),
            section_type: section_type.to_ascii_lowercase(),
            attributes: preferences.attributes.clone(),
            fallback_used,
        })
    }
}
