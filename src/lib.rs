//! pagecraft: section and outline generation for block-based pages
//!
//! Turns a brief plus a structural blueprint into a page outline, and a
//! per-section request into rendered block markup. Generation can be grounded
//! in retrieved reference material, is cited back to its sources, and is
//! costed per call.

pub mod api;
pub mod blocks;
pub mod blueprint;
pub mod citation;
pub mod cli;
pub mod config;
pub mod cost;
pub mod error;
pub mod image;
pub mod logging;
pub mod outline;
pub mod prompt;
pub mod provider;
pub mod request;
pub mod retrieval;
pub mod section;
pub mod types;

pub use api::PipelineApi;
pub use error::ApiError;
