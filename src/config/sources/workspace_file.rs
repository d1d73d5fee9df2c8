//! Workspace config files: config/config.toml then config/{PAGECRAFT_ENV}.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

pub const ENV_VAR: &str = "PAGECRAFT_ENV";

pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let config_dir = workspace_root.join("config");
    let env_name = std::env::var(ENV_VAR).unwrap_or_else(|_| "development".to_string());

    for path in [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ] {
        if path.is_file() {
            builder = builder.add_source(File::from(path).required(false));
        }
    }

    Ok(builder)
}
