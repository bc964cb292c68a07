//! Orchestrator contract: the multi-language code generator seen from the pipeline.
//!
//! The pipeline treats generation as a pure function of a validated schema.
//! Implementations may render languages concurrently; results come back keyed
//! by language and the pipeline imposes its own stable order when assembling.
use crate::data_model::CanonicalSchema;
use crate::language::Language;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Options passed alongside the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    pub languages: Vec<Language>,
    pub package_name: String,
    pub package_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_description: Option<String>,
    pub parallel: bool,
    pub write_files: bool,
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// What the orchestrator produced for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageResult {
    pub files: Vec<GeneratedFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Wall-clock render time for this language.
    #[serde(default)]
    pub duration_ms: u64,
}

impl LanguageResult {
    /// A result carrying only an error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}

/// Full orchestrator response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub results: BTreeMap<Language, LanguageResult>,
}

impl GenerationOutcome {
    /// Success iff no language reported an error.
    pub fn is_success(&self) -> bool {
        self.results.values().all(|r| r.errors.is_empty())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("GEN/unsupported language {0}")]
    UnsupportedLanguage(Language),
    #[error("GEN/render: {0}")]
    Render(String),
    #[error("GEN/internal: {0}")]
    Internal(String),
}

/// The external multi-language generator.
#[async_trait]
pub trait GenerationOrchestrator: Send + Sync {
    /// Generates client libraries for `options.languages` from `schema`.
    async fn generate(
        &self,
        schema: &CanonicalSchema,
        options: &GenerateOptions,
    ) -> Result<GenerationOutcome, OrchestratorError>;
}
