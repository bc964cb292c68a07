//! Type-mapping classification.
//!
//! Confidence measures how mechanical a mapping is, not how likely it is to be
//! correct: objects, arrays and enums map one-to-one, a handful of primitives
//! are representable everywhere, unions need a lossy encoding somewhere, and
//! anything unrecognized falls back.
use sdkgen_core::{CanonicalSchema, Language, TypeDefinition, TypeKind};
use serde::{Deserialize, Serialize};

/// Primitives every supported language represents natively.
pub const UNIVERSAL_PRIMITIVES: &[&str] = &["string", "integer", "float", "boolean", "null"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingClass {
    Exact,
    Approximate,
    Fallback,
}

impl MappingClass {
    /// Confidence of a single decision of this class.
    pub fn confidence(&self) -> f64 {
        match self {
            MappingClass::Exact => 1.0,
            MappingClass::Approximate => 0.9,
            MappingClass::Fallback => 0.7,
        }
    }
}

/// Confidence reported for one decision at a time.
pub fn decision_confidence(class: MappingClass) -> f64 {
    class.confidence()
}

/// Classifies one schema type.
pub fn classify(def: &TypeDefinition) -> MappingClass {
    match def.kind {
        TypeKind::Object | TypeKind::Array | TypeKind::Enum => MappingClass::Exact,
        TypeKind::Primitive => match def.primitive.as_deref() {
            Some(p) if UNIVERSAL_PRIMITIVES.contains(&p) => MappingClass::Exact,
            _ => MappingClass::Approximate,
        },
        TypeKind::Union => MappingClass::Approximate,
        TypeKind::Other => MappingClass::Fallback,
    }
}

/// Tally of mapping classes for one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageMapping {
    pub language: String,
    pub exact: usize,
    pub approximate: usize,
    pub fallback: usize,
    pub confidence: f64,
}

impl LanguageMapping {
    pub fn total(&self) -> usize {
        self.exact + self.approximate + self.fallback
    }
}

/// Scores the mapping of every schema type into `language`.
pub fn map_language(schema: &CanonicalSchema, language: &str) -> LanguageMapping {
    let (mut exact, mut approximate, mut fallback) = (0usize, 0usize, 0usize);
    for def in &schema.types {
        match classify(def) {
            MappingClass::Exact => exact += 1,
            MappingClass::Approximate => approximate += 1,
            MappingClass::Fallback => fallback += 1,
        }
    }

    let total = schema.types.len();
    let confidence = if total == 0 {
        1.0
    } else {
        let total = total as f64;
        (exact as f64 / total) * MappingClass::Exact.confidence()
            + (approximate as f64 / total) * MappingClass::Approximate.confidence()
            + (fallback as f64 / total) * MappingClass::Fallback.confidence()
    };

    LanguageMapping {
        language: canonical_tag(language),
        exact,
        approximate,
        fallback,
        confidence,
    }
}

/// Canonical tag for a requested language, or the lowercased raw value.
pub(crate) fn canonical_tag(raw: &str) -> String {
    raw.parse::<Language>()
        .map(|lang| lang.as_str().to_string())
        .unwrap_or_else(|_| raw.trim().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn def(value: serde_json::Value) -> TypeDefinition {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_classify_kinds() {
        let cases = [
            (json!({ "id": "a", "name": "a", "kind": "object" }), MappingClass::Exact),
            (json!({ "id": "a", "name": "a", "kind": "array", "items": "b" }), MappingClass::Exact),
            (json!({ "id": "a", "name": "a", "kind": "enum", "values": ["x"] }), MappingClass::Exact),
            (json!({ "id": "a", "name": "a", "kind": "primitive", "primitive": "boolean" }), MappingClass::Exact),
            (json!({ "id": "a", "name": "a", "kind": "primitive", "primitive": "date-time" }), MappingClass::Approximate),
            (json!({ "id": "a", "name": "a", "kind": "primitive" }), MappingClass::Approximate),
            (json!({ "id": "a", "name": "a", "kind": "union", "variants": ["b"] }), MappingClass::Approximate),
            (json!({ "id": "a", "name": "a", "kind": "tuple" }), MappingClass::Fallback),
        ];
        for (value, expected) in cases {
            assert_eq!(classify(&def(value.clone())), expected, "{}", value);
        }
    }

    #[test]
    fn test_decision_confidence() {
        assert_eq!(decision_confidence(MappingClass::Exact), 1.0);
        assert_eq!(decision_confidence(MappingClass::Approximate), 0.9);
        assert_eq!(decision_confidence(MappingClass::Fallback), 0.7);
    }

    #[test]
    fn test_map_language_ratios() {
        let schema: CanonicalSchema = serde_json::from_value(json!({
            "metadata": {},
            "types": [
                { "id": "a", "name": "a", "kind": "object" },
                { "id": "b", "name": "b", "kind": "union", "variants": ["a"] },
                { "id": "c", "name": "c", "kind": "tuple" },
                { "id": "d", "name": "d", "kind": "enum", "values": ["x"] }
            ]
        }))
        .unwrap();
        let mapping = map_language(&schema, "TS");
        assert_eq!(mapping.language, "typescript");
        assert_eq!((mapping.exact, mapping.approximate, mapping.fallback), (2, 1, 1));
        let expected = 0.5 * 1.0 + 0.25 * 0.9 + 0.25 * 0.7;
        assert!((mapping.confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_types_is_exact() {
        let schema: CanonicalSchema =
            serde_json::from_value(json!({ "metadata": {} })).unwrap();
        assert_eq!(map_language(&schema, "go").confidence, 1.0);
    }
}
