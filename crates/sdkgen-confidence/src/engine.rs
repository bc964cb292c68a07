//! Confidence engine: weighted combination of the four confidence factors.
use crate::completeness;
use crate::mapping::{self, canonical_tag, LanguageMapping};
use sdkgen_core::{CanonicalSchema, Language};
use serde::{Deserialize, Serialize};

/// Coarse label surfaced to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSemantics {
    Deterministic,
    ConstraintBased,
    Heuristic,
}

impl ConfidenceSemantics {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceSemantics::Deterministic => "deterministic",
            ConfidenceSemantics::ConstraintBased => "constraint_based",
            ConfidenceSemantics::Heuristic => "heuristic",
        }
    }

    /// Label for a rounded overall score.
    pub fn for_score(score: f64) -> Self {
        if score == 1.0 {
            ConfidenceSemantics::Deterministic
        } else if score >= 0.9 {
            ConfidenceSemantics::ConstraintBased
        } else {
            ConfidenceSemantics::Heuristic
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBreakdown {
    pub type_mapping: f64,
    pub template: f64,
    pub schema_completeness: f64,
    pub language_support: f64,
}

/// Quantified trust in the upcoming generation decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceResult {
    /// Overall score in `[0, 1]`, rounded to three decimals.
    pub score: f64,
    pub semantics: ConfidenceSemantics,
    pub breakdown: ConfidenceBreakdown,
    pub deductions: Vec<String>,
    /// Per-language type-mapping detail.
    pub languages: Vec<LanguageMapping>,
}

/// Factor weights. They sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceWeights {
    pub type_mapping: f64,
    pub template: f64,
    pub schema_completeness: f64,
    pub language_support: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            type_mapping: 0.3,
            template: 0.3,
            schema_completeness: 0.2,
            language_support: 0.2,
        }
    }
}

/// Templates are static and deterministic.
pub const TEMPLATE_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Clone, Default)]
pub struct ConfidenceEngine {
    weights: ConfidenceWeights,
}

impl ConfidenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores `schema` for the requested `languages` (raw tags, possibly with
    /// duplicates or unsupported values).
    pub fn score<S: AsRef<str>>(&self, schema: &CanonicalSchema, languages: &[S]) -> ConfidenceResult {
        let requested = dedup_tags(languages);
        let mut deductions = Vec::new();

        let per_language: Vec<LanguageMapping> = requested
            .iter()
            .map(|lang| mapping::map_language(schema, lang))
            .collect();
        for mapping in &per_language {
            if mapping.fallback > 0 {
                deductions.push(format!(
                    "{}: {} type(s) use fallback mapping",
                    mapping.language, mapping.fallback
                ));
            }
        }
        let type_mapping = if per_language.is_empty() {
            1.0
        } else {
            per_language.iter().map(|m| m.confidence).sum::<f64>() / per_language.len() as f64
        };

        let report = completeness::assess(schema);
        if report.loss() > 0.0 {
            deductions.push(format!(
                "schema completeness reduced by {:.1}% ({})",
                report.loss() * 100.0,
                report.gaps.join("; ")
            ));
        }
        let completeness = report.score;

        let language_support = if requested.is_empty() {
            0.0
        } else {
            let supported = requested.iter().filter(|l| l.parse::<Language>().is_ok()).count();
            supported as f64 / requested.len() as f64
        };

        let weights = &self.weights;
        let raw = weights.type_mapping * type_mapping
            + weights.template * TEMPLATE_CONFIDENCE
            + weights.schema_completeness * completeness
            + weights.language_support * language_support;
        let score = round3(raw.clamp(0.0, 1.0));

        ConfidenceResult {
            score,
            semantics: ConfidenceSemantics::for_score(score),
            breakdown: ConfidenceBreakdown {
                type_mapping,
                template: TEMPLATE_CONFIDENCE,
                schema_completeness: completeness,
                language_support,
            },
            deductions,
            languages: per_language,
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn dedup_tags<S: AsRef<str>>(languages: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in languages {
        let tag = canonical_tag(raw.as_ref());
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> CanonicalSchema {
        serde_json::from_value(value).unwrap()
    }

    fn documented(types: serde_json::Value) -> CanonicalSchema {
        schema(json!({
            "metadata": { "description": "API" },
            "types": types,
            "errors": [{ "code": "oops" }]
        }))
    }

    #[test]
    fn test_fully_mechanical_schema_is_deterministic() {
        let schema = documented(json!([
            { "id": "a", "name": "a", "kind": "object", "description": "A" }
        ]));
        let result = ConfidenceEngine::new().score(&schema, &["typescript", "python"]);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.semantics, ConfidenceSemantics::Deterministic);
        assert!(result.deductions.is_empty());
    }

    #[test]
    fn test_completeness_loss_becomes_percentage_deduction() {
        let schema = schema(json!({ "metadata": {} }));
        let result = ConfidenceEngine::new().score(&schema, &["go"]);
        assert_eq!(result.deductions.len(), 1);
        assert!(
            result.deductions[0].starts_with("schema completeness reduced by 5.0%"),
            "{}",
            result.deductions[0]
        );
        assert!((result.breakdown.schema_completeness - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_union_lowers_type_mapping() {
        let schema = documented(json!([
            { "id": "a", "name": "a", "kind": "object", "description": "A" },
            { "id": "u", "name": "u", "kind": "union", "variants": ["a"], "description": "U" }
        ]));
        let result = ConfidenceEngine::new().score(&schema, &["go"]);
        assert!(result.breakdown.type_mapping < 1.0);
        assert!((result.breakdown.type_mapping - 0.95).abs() < 1e-12);
        // 0.3 * 0.95 + 0.3 + 0.2 + 0.2 = 0.985
        assert_eq!(result.score, 0.985);
        assert_eq!(result.semantics, ConfidenceSemantics::ConstraintBased);
    }

    #[test]
    fn test_fallback_adds_deduction_per_language() {
        let schema = documented(json!([
            { "id": "t", "name": "t", "kind": "tuple", "description": "T" }
        ]));
        let result = ConfidenceEngine::new().score(&schema, &["rust", "java"]);
        assert_eq!(
            result.deductions,
            vec![
                "rust: 1 type(s) use fallback mapping".to_string(),
                "java: 1 type(s) use fallback mapping".to_string(),
            ]
        );
    }

    #[test]
    fn test_unsupported_languages_lower_support() {
        let schema = documented(json!([]));
        let result = ConfidenceEngine::new().score(&schema, &["python", "cobol"]);
        assert_eq!(result.breakdown.language_support, 0.5);
        assert_eq!(result.score, 0.9);
        assert_eq!(result.semantics, ConfidenceSemantics::ConstraintBased);
    }

    #[test]
    fn test_duplicate_languages_counted_once() {
        let schema = documented(json!([]));
        let result = ConfidenceEngine::new().score(&schema, &["ts", "typescript", "TypeScript"]);
        assert_eq!(result.languages.len(), 1);
        assert_eq!(result.breakdown.language_support, 1.0);
    }

    #[test]
    fn test_heuristic_label() {
        let schema = schema(json!({
            "metadata": {},
            "types": [
                { "id": "t", "name": "t", "kind": "tuple" },
                { "id": "u", "name": "u", "kind": "tuple" }
            ]
        }));
        let result = ConfidenceEngine::new().score(&schema, &["cobol"]);
        assert!(result.score < 0.9);
        assert_eq!(result.semantics, ConfidenceSemantics::Heuristic);
        assert!(result.score >= 0.0 && result.score <= 1.0);
    }

    #[test]
    fn test_semantics_thresholds() {
        assert_eq!(ConfidenceSemantics::for_score(1.0), ConfidenceSemantics::Deterministic);
        assert_eq!(ConfidenceSemantics::for_score(0.999), ConfidenceSemantics::ConstraintBased);
        assert_eq!(ConfidenceSemantics::for_score(0.9), ConfidenceSemantics::ConstraintBased);
        assert_eq!(ConfidenceSemantics::for_score(0.899), ConfidenceSemantics::Heuristic);
    }
}
