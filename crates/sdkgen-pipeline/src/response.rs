//! Caller-facing response shapes.
use crate::artifact::SdkArtifact;
use sdkgen_confidence::ConfidenceResult;
use sdkgen_core::{FailureMode, PipelineError};
use serde::{Deserialize, Serialize};

pub const HEADER_AGENT_ID: &str = "x-agent-id";
pub const HEADER_AGENT_VERSION: &str = "x-agent-version";
pub const HEADER_REQUEST_ID: &str = "x-request-id";
pub const HEADER_DETERMINISM_HASH: &str = "x-determinism-hash";

/// Reproducibility block of a generation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compatibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub agent_version: String,
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub determinism_hash: String,
    pub input_hash: String,
    pub output_hash: String,
}

/// Body of a 200 or 207 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationBody {
    /// False for partial success.
    pub success: bool,
    pub request_id: String,
    pub artifacts: Vec<SdkArtifact>,
    pub compatibility: Compatibility,
    pub confidence: ConfidenceResult,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: FailureMode,
    pub message: String,
    pub recoverable: bool,
    pub action: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl From<&PipelineError> for ErrorDetail {
    fn from(error: &PipelineError) -> Self {
        let mode = error.failure_mode();
        Self {
            code: mode,
            message: error.to_string(),
            recoverable: mode.recoverable(),
            action: mode.action().to_string(),
            errors: error.details(),
        }
    }
}

/// Body of every aborted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub request_id: String,
    pub error: ErrorDetail,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Generation(Box<GenerationBody>),
    Error(ErrorBody),
}

/// Status, metadata headers and body of one handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: ResponseBody,
}

impl PipelineResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        matches!(&self.body, ResponseBody::Generation(body) if body.success)
    }

    pub fn generation(&self) -> Option<&GenerationBody> {
        match &self.body {
            ResponseBody::Generation(body) => Some(body),
            ResponseBody::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorDetail> {
        match &self.body {
            ResponseBody::Error(body) => Some(&body.error),
            ResponseBody::Generation(_) => None,
        }
    }

    /// Failure mode of an error response.
    pub fn failure_mode(&self) -> Option<FailureMode> {
        self.error().map(|e| e.code)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.body)
    }
}
