//! CLI parse: clap types for pagecraft. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pagecraft - outline and section generation for block-based pages
#[derive(Parser)]
#[command(name = "pagecraft")]
#[command(about = "Generate page outlines and block-based sections from a brief")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root (config/ is read from here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides layered config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path, used with --log-output file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Plan a page outline from a blueprint JSON file
    Outline {
        /// Blueprint JSON file
        #[arg(long)]
        blueprint: PathBuf,
        /// What the page is about
        #[arg(long)]
        brief: String,
        #[arg(long, default_value = "general audience")]
        audience: String,
        #[arg(long, default_value = "professional")]
        tone: String,
        /// Skip the generation service and derive the outline offline
        #[arg(long)]
        stub: bool,
    },
    /// Generate one section from a request JSON file
    Section {
        #[arg(long)]
        request: PathBuf,
    },
    /// Estimate generation cost for token counts
    Estimate {
        #[arg(long)]
        prompt_tokens: u32,
        #[arg(long)]
        response_tokens: u32,
        #[arg(long, default_value = "default")]
        service: String,
    },
    /// List configured generation providers
    Providers {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Outline { .. } => "outline",
            Commands::Section { .. } => "section",
            Commands::Estimate { .. } => "estimate",
            Commands::Providers { .. } => "providers",
        }
    }
}
