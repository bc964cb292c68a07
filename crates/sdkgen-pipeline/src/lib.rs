//! SDKGen Pipeline: the generation request state machine.
//!
//! [`PipelineHandler::handle`] takes raw request bytes and an
//! [`InvocationContext`](sdkgen_core::InvocationContext) and always returns a
//! response; failures are classified into the failure taxonomy rather than
//! escaping the handler.

pub mod artifact;
pub mod config;
pub mod handler;
pub mod response;

pub use artifact::{assemble, output_hash, ArtifactFile, ArtifactMetrics, Assembly, LanguageSummary, SdkArtifact};
pub use config::{PipelineConfig, DEFAULT_MAX_BODY_BYTES, DEFAULT_MIN_GENERATION_HEADROOM};
pub use handler::{Handled, PipelineHandler, PipelineState};
pub use response::{
    Compatibility, ErrorBody, ErrorDetail, GenerationBody, PipelineResponse, ResponseBody,
    HEADER_AGENT_ID, HEADER_AGENT_VERSION, HEADER_DETERMINISM_HASH, HEADER_REQUEST_ID,
};
