//! SDKGen Validation: structural, semantic and schema-consistency checks.
//!
//! # Flow
//!
//! ```text
//! raw JSON → structural (JSON Schema) → parse → semantic → schema consistency
//!               ↓ invalid                          ↓ errors        ↓ issues
//!          INVALID_SCHEMA                   INVALID_SCHEMA   SCHEMA_VALIDATION_FAILURE
//! ```
//!
//! Structural failures return immediately; semantic checks never run on a
//! request whose shape is wrong.

pub mod consistency;
pub mod outcome;
pub mod semantic;
pub mod structural;

pub use consistency::{check_schema, SchemaIssue};
pub use outcome::ValidationOutcome;
pub use semantic::{is_semver, SemanticValidator, RESERVED_PACKAGE_NAMES};
pub use structural::{parse_request, validate_structure, REQUEST_SCHEMA};

use serde_json::Value;

/// Full request validation: structural pass, then semantic pass.
pub fn validate(value: &Value) -> ValidationOutcome {
    match parse_request(value.clone()) {
        Ok(request) => SemanticValidator::new().validate(&request),
        Err(outcome) => outcome,
    }
}
