//! Decision events: immutable, append-only facts about one request.
use chrono::{DateTime, Utc};
use sdkgen_core::{FailureMode, TracingContext};
use serde::{Deserialize, Serialize};

/// One emitted fact. Fields are only readable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionEvent {
    event_id: String,
    agent_id: String,
    agent_version: String,
    request_id: String,
    input_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_hash: Option<String>,
    kind: EventKind,
    emitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tracing: Option<TracingContext>,
}

impl DecisionEvent {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        event_id: String,
        agent_id: String,
        agent_version: String,
        request_id: String,
        input_hash: String,
        output_hash: Option<String>,
        kind: EventKind,
        tracing: Option<TracingContext>,
    ) -> Self {
        Self {
            event_id,
            agent_id,
            agent_version,
            request_id,
            input_hash,
            output_hash,
            kind,
            emitted_at: Utc::now(),
            tracing,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn agent_version(&self) -> &str {
        &self.agent_version
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn input_hash(&self) -> &str {
        &self.input_hash
    }

    pub fn output_hash(&self) -> Option<&str> {
        self.output_hash.as_deref()
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn emitted_at(&self) -> DateTime<Utc> {
        self.emitted_at
    }

    pub fn tracing(&self) -> Option<&TracingContext> {
        self.tracing.as_ref()
    }

    /// Short type label, e.g. `initiated`.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Event kind and its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Initiated(Initiated),
    Completed(Completed),
    Failed(Failed),
    TypeMappingDecision(TypeMappingDecision),
    LanguageGenerationDecision(LanguageGenerationDecision),
    Telemetry(Telemetry),
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Initiated(_) => "initiated",
            EventKind::Completed(_) => "completed",
            EventKind::Failed(_) => "failed",
            EventKind::TypeMappingDecision(_) => "type_mapping_decision",
            EventKind::LanguageGenerationDecision(_) => "language_generation_decision",
            EventKind::Telemetry(_) => "telemetry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiated {
    pub target_languages: Vec<String>,
    pub package_name: String,
    pub package_version: String,
    pub type_count: usize,
    pub endpoint_count: usize,
    pub confidence: f64,
    pub confidence_semantics: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Success,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completed {
    pub status: CompletionStatus,
    pub languages: Vec<String>,
    pub file_count: usize,
    pub total_bytes: usize,
    pub determinism_hash: String,
    pub warning_count: usize,
    pub error_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failed {
    pub failure_mode: FailureMode,
    pub message: String,
    pub recoverable: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMappingDecision {
    pub language: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub exact: usize,
    pub approximate: usize,
    pub fallback: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageGenerationDecision {
    pub language: String,
    pub success: bool,
    pub file_count: usize,
    pub total_bytes: usize,
    pub warning_count: usize,
    pub error_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub duration_ms: u64,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_mode: Option<FailureMode>,
}
