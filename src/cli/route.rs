//! CLI route: run context and the single command dispatch table.

use crate::api::PipelineApi;
use crate::blueprint::Blueprint;
use crate::cli::output::to_pretty_json;
use crate::cli::parse::Commands;
use crate::cli::presentation::{format_providers_json, format_providers_text};
use crate::config::{ConfigLoader, PagecraftConfig};
use crate::error::ApiError;
use crate::outline::OutlineParams;
use crate::request::GenerationRequest;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Loaded configuration plus the pipeline built from it.
pub struct RunContext {
    config: PagecraftConfig,
    api: PipelineApi,
}

impl RunContext {
    /// Load layered config for the workspace, or one explicit file.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(&path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::from_config(config)
    }

    pub fn from_config(config: PagecraftConfig) -> Result<Self, ApiError> {
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        let api = PipelineApi::from_config(&config)?;
        Ok(Self { config, api })
    }

    pub fn api(&self) -> &PipelineApi {
        &self.api
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command).await;
        info!(
            command = command.name(),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Outline {
                blueprint,
                brief,
                audience,
                tone,
                stub,
            } => {
                let blueprint: Blueprint = read_json(blueprint)?;
                let params = OutlineParams {
                    brief: brief.clone(),
                    audience: audience.clone(),
                    tone: tone.clone(),
                    development: *stub,
                };
                let outline = self.api.generate_outline(&params, &blueprint).await;
                to_pretty_json(&outline)
            }
            Commands::Section { request } => {
                let request: GenerationRequest = read_json(request)?;
                let section = self.api.generate_section(&request).await?;
                to_pretty_json(&section)
            }
            Commands::Estimate {
                prompt_tokens,
                response_tokens,
                service,
            } => {
                let cost = self
                    .api
                    .estimator()
                    .estimate(service, *prompt_tokens, *response_tokens);
                to_pretty_json(&json!({
                    "service": service,
                    "promptTokens": prompt_tokens,
                    "responseTokens": response_tokens,
                    "costUsd": cost,
                }))
            }
            Commands::Providers { format } => match format.as_str() {
                "json" => Ok(format_providers_json(&self.config)),
                "text" => Ok(format_providers_text(&self.config)),
                other => Err(ApiError::Validation(format!(
                    "Unknown format '{}' (expected text or json)",
                    other
                ))),
            },
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ApiError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&raw)?)
}
