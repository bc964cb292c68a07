//! Artifact assembly and the output hash.
use sdkgen_core::{hash_bytes, hash_canonical, GenerationOutcome, HashError, Language};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactFile {
    pub path: String,
    pub content: String,
    /// `blake3:<hex>` of exactly `content`'s bytes.
    pub content_hash: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetrics {
    pub file_count: usize,
    pub total_bytes: usize,
    pub duration_ms: u64,
}

/// Reportable unit for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkArtifact {
    pub language: Language,
    pub files: Vec<ArtifactFile>,
    pub metrics: ArtifactMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,
}

/// Per-language tally reported as a decision event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSummary {
    pub language: Language,
    pub success: bool,
    pub file_count: usize,
    pub total_bytes: usize,
    pub warning_count: usize,
    pub error_count: usize,
}

/// Everything derived from one orchestrator outcome.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    /// Artifacts of the languages that generated without errors, in request order.
    pub artifacts: Vec<SdkArtifact>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub summaries: Vec<LanguageSummary>,
}

impl Assembly {
    pub fn failed_languages(&self) -> usize {
        self.summaries.iter().filter(|s| !s.success).count()
    }

    pub fn all_failed(&self) -> bool {
        !self.summaries.is_empty() && self.failed_languages() == self.summaries.len()
    }

    pub fn file_count(&self) -> usize {
        self.artifacts.iter().map(|a| a.metrics.file_count).sum()
    }

    pub fn total_bytes(&self) -> usize {
        self.artifacts.iter().map(|a| a.metrics.total_bytes).sum()
    }
}

/// Walks `requested` in order and turns the orchestrator's results into artifacts.
///
/// A requested language missing from the outcome is recorded as an error.
pub fn assemble(requested: &[Language], mut outcome: GenerationOutcome) -> Assembly {
    let mut assembly = Assembly::default();

    for &language in requested {
        let Some(result) = outcome.results.remove(&language) else {
            assembly.errors.push(format!(
                "[{}] orchestrator returned no result for this language",
                language
            ));
            assembly.summaries.push(LanguageSummary {
                language,
                success: false,
                file_count: 0,
                total_bytes: 0,
                warning_count: 0,
                error_count: 1,
            });
            continue;
        };

        assembly
            .warnings
            .extend(result.warnings.iter().map(|w| format!("[{}] {}", language, w)));
        assembly
            .errors
            .extend(result.errors.iter().map(|e| format!("[{}] {}", language, e)));

        let files: Vec<ArtifactFile> = result
            .files
            .into_iter()
            .map(|file| ArtifactFile {
                content_hash: hash_bytes(file.content.as_bytes()),
                size: file.content.len(),
                path: file.path,
                content: file.content,
            })
            .collect();
        let total_bytes = files.iter().map(|f| f.size).sum();
        let success = result.errors.is_empty();

        assembly.summaries.push(LanguageSummary {
            language,
            success,
            file_count: files.len(),
            total_bytes,
            warning_count: result.warnings.len(),
            error_count: result.errors.len(),
        });

        if success {
            assembly.artifacts.push(SdkArtifact {
                language,
                metrics: ArtifactMetrics {
                    file_count: files.len(),
                    total_bytes,
                    duration_ms: result.duration_ms,
                },
                files,
                build_command: result.build_command,
                test_command: result.test_command,
                publish_command: result.publish_command,
                registry_url: result.registry_url,
            });
        }
    }

    for language in outcome.results.keys() {
        tracing::debug!(language = %language, "ignoring result for a language that was not requested");
    }

    assembly
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileDigest<'a> {
    path: &'a str,
    content_hash: &'a str,
    size: usize,
}

/// Hashed view of an artifact. Wall-clock duration is left out.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactDigest<'a> {
    language: Language,
    files: Vec<FileDigest<'a>>,
    build_command: Option<&'a str>,
    test_command: Option<&'a str>,
    publish_command: Option<&'a str>,
    registry_url: Option<&'a str>,
}

/// Output hash over the artifact list.
pub fn output_hash(artifacts: &[SdkArtifact]) -> Result<String, HashError> {
    let digest: Vec<ArtifactDigest<'_>> = artifacts
        .iter()
        .map(|a| ArtifactDigest {
            language: a.language,
            files: a
                .files
                .iter()
                .map(|f| FileDigest {
                    path: &f.path,
                    content_hash: &f.content_hash,
                    size: f.size,
                })
                .collect(),
            build_command: a.build_command.as_deref(),
            test_command: a.test_command.as_deref(),
            publish_command: a.publish_command.as_deref(),
            registry_url: a.registry_url.as_deref(),
        })
        .collect();
    hash_canonical(&digest)
}
