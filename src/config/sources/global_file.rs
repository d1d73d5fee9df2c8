//! Global config file: $XDG_CONFIG_HOME/pagecraft/config.toml or ~/.config/pagecraft/config.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use directories::BaseDirs;
use std::path::PathBuf;
use tracing::debug;

const APP_DIR: &str = "pagecraft";

/// Path to the global config file, whether or not it exists.
pub fn global_config_path() -> Option<PathBuf> {
    let config_home = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => BaseDirs::new()?.home_dir().join(".config"),
    };
    Some(config_home.join(APP_DIR).join("config.toml"))
}

/// Add the global config file to the builder when it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match global_config_path() {
        Some(path) if path.is_file() => {
            Ok(builder.add_source(File::from(path).required(false)))
        }
        Some(path) => {
            debug!(config_path = %path.display(), "No global configuration file");
            Ok(builder)
        }
        None => Ok(builder),
    }
}
