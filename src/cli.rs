//! CLI domain: parse, route, output and presentation only.
//! No generation logic; the route table dispatches to [`crate::api::PipelineApi`].

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{format_providers_json, format_providers_text};
pub use route::RunContext;
