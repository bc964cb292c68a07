//! Structural validation against the declarative request contract.
use crate::outcome::ValidationOutcome;
use jsonschema::{Draft, Validator};
use once_cell::sync::Lazy;
use sdkgen_core::GenerationRequest;
use serde_json::Value;

/// Embedded JSON Schema for `GenerationRequest`.
pub const REQUEST_SCHEMA: &str = include_str!("../schemas/generation-request.schema.json");

static REQUEST_VALIDATOR: Lazy<Result<Validator, String>> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(REQUEST_SCHEMA).map_err(|e| e.to_string())?;
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|e| format!("invalid request schema: {e}"))
});

/// Checks field presence, types and enumerations of a raw request.
pub fn validate_structure(value: &Value) -> ValidationOutcome {
    let validator = match REQUEST_VALIDATOR.as_ref() {
        Ok(validator) => validator,
        Err(reason) => {
            tracing::error!(%reason, "request contract failed to compile");
            return ValidationOutcome::from_errors(vec![reason.clone()]);
        }
    };
    let errors: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
    ValidationOutcome::from_errors(errors)
}

/// Validates the shape of `value` and, if it passes, deserializes it.
pub fn parse_request(value: Value) -> Result<GenerationRequest, ValidationOutcome> {
    let outcome = validate_structure(&value);
    if !outcome.is_valid() {
        return Err(outcome);
    }
    serde_json::from_value(value)
        .map_err(|e| ValidationOutcome::from_errors(vec![format!("request: {e}")]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "targetLanguages": ["typescript"],
            "schema": { "metadata": { "version": "1.0.0", "providerId": "acme" } },
            "package": { "name": "acme", "version": "1.0.0" }
        })
    }

    #[test]
    fn test_minimal_request_passes() {
        let outcome = validate_structure(&minimal());
        assert!(outcome.is_valid(), "{:?}", outcome.errors());
    }

    #[test]
    fn test_missing_required_field() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("package");
        let outcome = validate_structure(&value);
        assert!(!outcome.is_valid());
        assert!(outcome.errors().iter().any(|e| e.contains("package")));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut value = minimal();
        value["targetLanguages"] = json!("typescript");
        assert!(!validate_structure(&value).is_valid());
    }

    #[test]
    fn test_empty_language_list_rejected() {
        let mut value = minimal();
        value["targetLanguages"] = json!([]);
        assert!(!validate_structure(&value).is_valid());
    }

    #[test]
    fn test_unknown_type_kind_rejected() {
        let mut value = minimal();
        value["schema"]["types"] = json!([{ "id": "T1", "name": "T", "kind": "tuple" }]);
        assert!(!validate_structure(&value).is_valid());
    }

    #[test]
    fn test_unknown_http_method_rejected() {
        let mut value = minimal();
        value["schema"]["endpoints"] = json!([{ "operationId": "x", "method": "FETCH", "path": "/" }]);
        assert!(!validate_structure(&value).is_valid());
    }

    #[test]
    fn test_unsupported_language_is_not_structural() {
        let mut value = minimal();
        value["targetLanguages"] = json!(["cobol"]);
        assert!(validate_structure(&value).is_valid());
    }

    #[test]
    fn test_parse_request_round_trip() {
        let request = parse_request(minimal()).unwrap();
        assert_eq!(request.package.name, "acme");
        assert_eq!(request.target_languages, vec!["typescript".to_string()]);
    }
}
