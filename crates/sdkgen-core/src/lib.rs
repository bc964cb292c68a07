//! SDKGen Core: data model, failure taxonomy, hashing and the orchestrator contract.
//!
//! Everything a single generation request carries through the pipeline is
//! defined here so that the validation, confidence, event and pipeline crates
//! agree on one vocabulary.

pub mod context;
pub mod data_model;
pub mod error;
pub mod hashing;
pub mod language;
pub mod orchestrator;

pub use context::InvocationContext;
pub use data_model::{
    AuthScheme, AuthSchemeKind, CanonicalSchema, Endpoint, ErrorDefinition, GenerationOptions,
    GenerationRequest, HttpMethod, PackageConfig, Parameter, ParameterLocation, Property,
    RequestBody, ResponseDefinition, SchemaMetadata, TracingContext, TypeDefinition, TypeKind,
};
pub use error::{FailureMode, HashError, PipelineError};
pub use hashing::{determinism_hash, hash_bytes, hash_canonical};
pub use language::{Language, UnknownLanguage};
pub use orchestrator::{
    GenerateOptions, GeneratedFile, GenerationOrchestrator, GenerationOutcome, LanguageResult,
    OrchestratorError,
};

/// Identity stamped on every response and decision event.
pub const AGENT_ID: &str = "sdk-generator";

/// Version of the generation agent.
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");
