//! SDKGen Confidence: how mechanical the upcoming generation decisions are.
//!
//! Generation is template-driven, so confidence never gates it; the score and
//! its semantics label annotate the request for operators.
//!
//! ```text
//! overall = 0.3·typeMapping + 0.3·template + 0.2·completeness + 0.2·languageSupport
//! ```
//!
//! # Example
//!
//! ```
//! use sdkgen_confidence::{score, ConfidenceSemantics};
//! use sdkgen_core::CanonicalSchema;
//!
//! let schema: CanonicalSchema = serde_json::from_value(serde_json::json!({
//!     "metadata": { "description": "Names API" },
//!     "types": [{ "id": "T1", "name": "Name", "kind": "primitive",
//!                 "primitive": "string", "description": "A name" }],
//!     "errors": [{ "code": "not_found" }]
//! })).unwrap();
//!
//! let result = score(&schema, &["typescript"]);
//! assert_eq!(result.semantics, ConfidenceSemantics::Deterministic);
//! ```

pub mod completeness;
pub mod engine;
pub mod mapping;

pub use completeness::{assess, CompletenessReport};
pub use engine::{
    ConfidenceBreakdown, ConfidenceEngine, ConfidenceResult, ConfidenceSemantics,
    ConfidenceWeights, TEMPLATE_CONFIDENCE,
};
pub use mapping::{
    classify, decision_confidence, map_language, LanguageMapping, MappingClass,
    UNIVERSAL_PRIMITIVES,
};

use sdkgen_core::CanonicalSchema;

/// Scores `schema` for `languages` with the default weights.
pub fn score<S: AsRef<str>>(schema: &CanonicalSchema, languages: &[S]) -> ConfidenceResult {
    ConfidenceEngine::new().score(schema, languages)
}
