//! SDKGen Templates: the reference in-process generation orchestrator.
//!
//! Each supported language has a YAML template set (see `templates/`) listing
//! the files of an installable client package as handlebars templates. The
//! [`TemplateOrchestrator`] reshapes the canonical schema into per-language
//! render data and renders the requested languages, concurrently when asked.

pub mod model;
pub mod naming;
pub mod orchestrator;
pub mod renderer;
pub mod templates;
pub mod types;

pub use orchestrator::TemplateOrchestrator;
pub use renderer::{LanguageRenderer, RenderedPackage};
pub use templates::TemplateSet;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template load failed: {0}")]
    Load(String),
    #[error("Template set parse failed: {0}")]
    Parse(String),
    #[error("Template {template} failed to compile: {message}")]
    Compile { template: String, message: String },
    #[error("Template {template} failed to render: {message}")]
    Render { template: String, message: String },
}
