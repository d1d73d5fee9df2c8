//! Configuration loading.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::PagecraftConfig;
use crate::error::ApiError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

pub const ENV_PREFIX: &str = "PAGECRAFT";

/// Loads [`PagecraftConfig`] from layered sources.
///
/// Precedence, lowest first: built-in defaults, the global file, the workspace
/// files, then `PAGECRAFT__SECTION__KEY` environment variables.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(workspace_root: &Path) -> Result<PagecraftConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = Self::finish(builder)?;
        debug!(
            workspace = %workspace_root.display(),
            providers = config.providers.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load one explicit file over the defaults. Environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<PagecraftConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        Self::finish(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<PagecraftConfig, ApiError> {
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("generation.namespaces")
                    .with_list_parse_key("retrieval.namespaces")
                    .with_list_parse_key("blocks.installed"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
