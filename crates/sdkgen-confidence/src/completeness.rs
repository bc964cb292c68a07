//! Schema completeness: documentation and error-model coverage.
use sdkgen_core::CanonicalSchema;
use serde::{Deserialize, Serialize};

const MISSING_SCHEMA_DESCRIPTION: f64 = 0.02;
const MAX_TYPE_DESCRIPTIONS: f64 = 0.05;
const MAX_ENDPOINT_DESCRIPTIONS: f64 = 0.05;
const UNEXPLAINED_DEPRECATION: f64 = 0.02;
const NO_ERROR_DEFINITIONS: f64 = 0.03;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// Score in `[0, 1]`.
    pub score: f64,
    /// Human-readable list of what lowered the score.
    pub gaps: Vec<String>,
}

impl CompletenessReport {
    pub fn loss(&self) -> f64 {
        1.0 - self.score
    }
}

fn undocumented(description: Option<&str>) -> bool {
    description.map_or(true, |d| d.trim().is_empty())
}

/// Scores how completely `schema` documents itself.
pub fn assess(schema: &CanonicalSchema) -> CompletenessReport {
    let mut score = 1.0f64;
    let mut gaps = Vec::new();

    if undocumented(schema.metadata.description.as_deref()) {
        score -= MISSING_SCHEMA_DESCRIPTION;
        gaps.push("schema has no description".to_string());
    }

    if !schema.types.is_empty() {
        let missing = schema
            .types
            .iter()
            .filter(|t| undocumented(t.description.as_deref()))
            .count();
        if missing > 0 {
            score -= MAX_TYPE_DESCRIPTIONS * missing as f64 / schema.types.len() as f64;
            gaps.push(format!("{missing}/{} types lack a description", schema.types.len()));
        }
    }

    if !schema.endpoints.is_empty() {
        let missing = schema
            .endpoints
            .iter()
            .filter(|e| undocumented(e.description.as_deref()))
            .count();
        if missing > 0 {
            score -= MAX_ENDPOINT_DESCRIPTIONS * missing as f64 / schema.endpoints.len() as f64;
            gaps.push(format!(
                "{missing}/{} endpoints lack a description",
                schema.endpoints.len()
            ));
        }
    }

    let unexplained = schema
        .types
        .iter()
        .any(|t| t.deprecated && undocumented(t.deprecation_message.as_deref()))
        || schema
            .endpoints
            .iter()
            .any(|e| e.deprecated && undocumented(e.deprecation_message.as_deref()));
    if unexplained {
        score -= UNEXPLAINED_DEPRECATION;
        gaps.push("deprecated items lack a deprecation message".to_string());
    }

    if schema.errors.is_empty() {
        score -= NO_ERROR_DEFINITIONS;
        gaps.push("no error definitions".to_string());
    }

    CompletenessReport {
        score: score.max(0.0),
        gaps,
    }
}
