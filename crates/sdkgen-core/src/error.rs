//! Failure taxonomy and the pipeline error type.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Operator-facing classification of every pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureMode {
    ResourceExhaustion,
    InvalidSchema,
    SchemaValidationFailure,
    Timeout,
    TemplateRenderingFailure,
}

impl FailureMode {
    pub const ALL: [FailureMode; 5] = [
        FailureMode::ResourceExhaustion,
        FailureMode::InvalidSchema,
        FailureMode::SchemaValidationFailure,
        FailureMode::Timeout,
        FailureMode::TemplateRenderingFailure,
    ];

    /// Stable wire code.
    pub fn code(&self) -> &'static str {
        match self {
            FailureMode::ResourceExhaustion => "RESOURCE_EXHAUSTION",
            FailureMode::InvalidSchema => "INVALID_SCHEMA",
            FailureMode::SchemaValidationFailure => "SCHEMA_VALIDATION_FAILURE",
            FailureMode::Timeout => "TIMEOUT",
            FailureMode::TemplateRenderingFailure => "TEMPLATE_RENDERING_FAILURE",
        }
    }

    /// Whether resubmitting the same request later can succeed.
    pub fn recoverable(&self) -> bool {
        matches!(self, FailureMode::Timeout)
    }

    /// Suggested caller action.
    pub fn action(&self) -> &'static str {
        match self {
            FailureMode::ResourceExhaustion => {
                "Reduce the request size below the configured ceiling and resubmit."
            }
            FailureMode::InvalidSchema => "Fix the reported request errors and resubmit.",
            FailureMode::SchemaValidationFailure => {
                "Repair the canonical schema references listed in the errors and resubmit."
            }
            FailureMode::Timeout => "Retry later with a larger execution budget.",
            FailureMode::TemplateRenderingFailure => {
                "Resubmit the request; if the failure persists, report the request id."
            }
        }
    }

    /// HTTP status code used for error responses.
    pub fn status_code(&self) -> u16 {
        match self {
            FailureMode::ResourceExhaustion => 413,
            FailureMode::InvalidSchema | FailureMode::SchemaValidationFailure => 400,
            FailureMode::Timeout => 408,
            FailureMode::TemplateRenderingFailure => 500,
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("HASH/canonicalize: {0}")]
    Canonicalize(String),
}

/// Every way a generation request can be aborted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("request body of {size} bytes exceeds the {limit} byte ceiling")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("request does not match the generation request contract")]
    StructuralValidation(Vec<String>),

    #[error("request failed semantic validation with {} error(s)", .0.len())]
    SemanticValidation(Vec<String>),

    #[error("canonical schema failed consistency checks with {} issue(s)", .0.len())]
    SchemaConsistency(Vec<String>),

    #[error("only {remaining_ms} ms of execution budget left, generation needs {required_ms} ms")]
    InsufficientTime { remaining_ms: u64, required_ms: u64 },

    #[error("no supported target language left after mapping")]
    NoTargetLanguages,

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("every requested language failed to generate")]
    AllLanguagesFailed(Vec<String>),

    #[error(transparent)]
    Hashing(#[from] HashError),
}

impl PipelineError {
    /// Classification of this error. Total over all variants.
    pub fn failure_mode(&self) -> FailureMode {
        match self {
            PipelineError::PayloadTooLarge { .. } => FailureMode::ResourceExhaustion,
            PipelineError::MalformedJson(_)
            | PipelineError::StructuralValidation(_)
            | PipelineError::SemanticValidation(_)
            | PipelineError::NoTargetLanguages => FailureMode::InvalidSchema,
            PipelineError::SchemaConsistency(_) => FailureMode::SchemaValidationFailure,
            PipelineError::InsufficientTime { .. } => FailureMode::Timeout,
            PipelineError::Generation(_)
            | PipelineError::AllLanguagesFailed(_)
            | PipelineError::Hashing(_) => FailureMode::TemplateRenderingFailure,
        }
    }

    /// Individual error strings carried alongside the summary message.
    pub fn details(&self) -> Vec<String> {
        match self {
            PipelineError::StructuralValidation(errors)
            | PipelineError::SemanticValidation(errors)
            | PipelineError::SchemaConsistency(errors)
            | PipelineError::AllLanguagesFailed(errors) => errors.clone(),
            PipelineError::MalformedJson(reason) => vec![reason.clone()],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeout_is_recoverable() {
        for mode in FailureMode::ALL {
            assert_eq!(mode.recoverable(), mode == FailureMode::Timeout, "{}", mode);
            assert!(!mode.action().is_empty());
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FailureMode::ResourceExhaustion.status_code(), 413);
        assert_eq!(FailureMode::InvalidSchema.status_code(), 400);
        assert_eq!(FailureMode::SchemaValidationFailure.status_code(), 400);
        assert_eq!(FailureMode::Timeout.status_code(), 408);
        assert_eq!(FailureMode::TemplateRenderingFailure.status_code(), 500);
    }

    #[test]
    fn test_serialized_code_matches_code() {
        for mode in FailureMode::ALL {
            let json = serde_json::to_value(mode).unwrap();
            assert_eq!(json, mode.code());
        }
    }

    #[test]
    fn test_error_classification() {
        let cases = [
            (
                PipelineError::PayloadTooLarge { size: 10, limit: 5 },
                FailureMode::ResourceExhaustion,
            ),
            (PipelineError::MalformedJson("eof".into()), FailureMode::InvalidSchema),
            (PipelineError::NoTargetLanguages, FailureMode::InvalidSchema),
            (
                PipelineError::SchemaConsistency(vec!["types[0].id: missing".into()]),
                FailureMode::SchemaValidationFailure,
            ),
            (
                PipelineError::InsufficientTime { remaining_ms: 1, required_ms: 30_000 },
                FailureMode::Timeout,
            ),
            (PipelineError::Generation("boom".into()), FailureMode::TemplateRenderingFailure),
            (
                PipelineError::Hashing(HashError::Canonicalize("nan".into())),
                FailureMode::TemplateRenderingFailure,
            ),
        ];
        for (error, mode) in cases {
            assert_eq!(error.failure_mode(), mode, "{}", error);
        }
    }

    #[test]
    fn test_details_carry_validation_errors() {
        let error = PipelineError::SemanticValidation(vec!["a".into(), "b".into()]);
        assert_eq!(error.details(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(error.to_string(), "request failed semantic validation with 2 error(s)");
    }
}
