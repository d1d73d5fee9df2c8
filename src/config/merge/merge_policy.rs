//! Defaults applied beneath every file and environment source.

use crate::retrieval::{DEFAULT_K, DEFAULT_MIN_SCORE};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("generation.stub_mode", false)?
        .set_default("generation.max_tokens", 1500)?
        .set_default("retrieval.k", DEFAULT_K as i64)?
        .set_default("retrieval.min_score", DEFAULT_MIN_SCORE)?
        .set_default("logging.level", "info")?
        .set_default("logging.output", "stderr")
}
