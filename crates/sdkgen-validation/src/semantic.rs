//! Semantic validation: cross-references inside the canonical schema and
//! request-level business rules.
//!
//! Checks run in a fixed order and accumulate; nothing short-circuits.
//!
//! ```text
//! metadata → type ids → endpoints/refs → auth → package name → version → languages → options
//! ```
use crate::outcome::ValidationOutcome;
use once_cell::sync::Lazy;
use regex::Regex;
use sdkgen_core::{CanonicalSchema, Endpoint, GenerationRequest, Language};
use std::collections::HashSet;

static PACKAGE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").expect("package name pattern"));

static SEMVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$",
    )
    .expect("semver pattern")
});

/// Package names that collide with ecosystem tooling.
pub const RESERVED_PACKAGE_NAMES: &[&str] = &[
    "node_modules",
    "npm",
    "pip",
    "setuptools",
    "cargo",
    "std",
    "core",
    "test",
    "go",
];

/// Whether `version` parses as `MAJOR.MINOR.PATCH[-pre][+build]`.
pub fn is_semver(version: &str) -> bool {
    SEMVER.is_match(version)
}

/// Semantic validator for structurally valid requests.
#[derive(Debug, Clone, Default)]
pub struct SemanticValidator;

impl SemanticValidator {
    pub fn new() -> Self {
        Self
    }

    /// Runs every semantic check on `request`.
    pub fn validate(&self, request: &GenerationRequest) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::new();
        check_metadata(&request.schema, &mut outcome);
        check_type_ids(&request.schema, &mut outcome);
        check_endpoints(&request.schema, &mut outcome);
        check_auth(&request.schema, &mut outcome);
        check_package_name(&request.package.name, &mut outcome);
        check_package_version(&request.package.version, &mut outcome);
        check_languages(&request.target_languages, &mut outcome);
        check_options(request, &mut outcome);

        if !outcome.is_valid() {
            tracing::debug!(
                errors = outcome.errors().len(),
                warnings = outcome.warnings().len(),
                "semantic validation failed"
            );
        }
        outcome
    }
}

fn check_metadata(schema: &CanonicalSchema, outcome: &mut ValidationOutcome) {
    if is_blank(schema.metadata.version.as_deref()) {
        outcome.error("schema.metadata.version is required");
    }
    if is_blank(schema.metadata.provider_id.as_deref()) {
        outcome.error("schema.metadata.providerId is required");
    }
}

fn check_type_ids(schema: &CanonicalSchema, outcome: &mut ValidationOutcome) {
    let mut seen = HashSet::new();
    for (index, def) in schema.types.iter().enumerate() {
        match def.id() {
            None => outcome.error(format!("types[{index}] ({}) is missing an id", def.name)),
            Some(id) => {
                if !seen.insert(id) {
                    outcome.error(format!("duplicate type id '{id}'"));
                }
            }
        }
    }
}

fn check_endpoints(schema: &CanonicalSchema, outcome: &mut ValidationOutcome) {
    let type_ids = schema.type_ids();
    let mut seen = HashSet::new();

    for (index, endpoint) in schema.endpoints.iter().enumerate() {
        let label = endpoint_label(endpoint);
        match endpoint.operation_id() {
            None => outcome.error(format!(
                "endpoints[{index}] ({label}) is missing an operationId"
            )),
            Some(op) => {
                if !seen.insert(op) {
                    outcome.error(format!("duplicate operationId '{op}'"));
                }
            }
        }

        if let Some(body) = &endpoint.request_body {
            if !type_ids.contains(body.type_ref.as_str()) {
                outcome.error(format!(
                    "endpoint '{label}': request body references unknown type '{}'",
                    body.type_ref
                ));
            }
        }

        for response in &endpoint.responses {
            if let Some(type_ref) = &response.type_ref {
                if !type_ids.contains(type_ref.as_str()) {
                    outcome.warning(format!(
                        "endpoint '{label}': response {} references unknown type '{type_ref}'",
                        response.status
                    ));
                }
            }
        }
    }
}

fn check_auth(schema: &CanonicalSchema, outcome: &mut ValidationOutcome) {
    let mut seen = HashSet::new();
    for (index, scheme) in schema.auth_schemes.iter().enumerate() {
        match scheme.id() {
            None => outcome.error(format!("authSchemes[{index}] is missing an id")),
            Some(id) => {
                if !seen.insert(id) {
                    outcome.error(format!("duplicate auth scheme id '{id}'"));
                }
            }
        }
    }

    let known = schema.auth_scheme_ids();
    for endpoint in &schema.endpoints {
        for auth in &endpoint.auth {
            if !known.contains(auth.as_str()) {
                outcome.warning(format!(
                    "endpoint '{}': unknown auth scheme '{auth}'",
                    endpoint_label(endpoint)
                ));
            }
        }
    }
}

fn check_package_name(name: &str, outcome: &mut ValidationOutcome) {
    if !PACKAGE_NAME.is_match(name) {
        outcome.warning(format!(
            "package name '{name}' should start with a letter and contain only letters, digits, '_' or '-'"
        ));
    }
    if RESERVED_PACKAGE_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
        outcome.error(format!("package name '{name}' is reserved"));
    }
}

fn check_package_version(version: &str, outcome: &mut ValidationOutcome) {
    if !is_semver(version) {
        outcome.error(format!(
            "package version '{version}' is not a semantic version (MAJOR.MINOR.PATCH[-pre][+build])"
        ));
    }
}

fn check_languages(requested: &[String], outcome: &mut ValidationOutcome) {
    let mut unsupported = Vec::new();
    let mut duplicates = Vec::new();
    let mut seen = HashSet::new();

    for raw in requested {
        match raw.parse::<Language>() {
            Ok(lang) => {
                if !seen.insert(lang) {
                    duplicates.push(raw.as_str());
                }
            }
            Err(_) => unsupported.push(raw.as_str()),
        }
    }

    if !unsupported.is_empty() {
        let supported: Vec<&str> = Language::ALL.iter().map(Language::as_str).collect();
        outcome.error(format!(
            "unsupported target language(s): {} (supported: {})",
            unsupported.join(", "),
            supported.join(", ")
        ));
    }
    if !duplicates.is_empty() {
        outcome.warning(format!(
            "duplicate target language(s) ignored: {}",
            duplicates.join(", ")
        ));
    }
}

fn check_options(request: &GenerationRequest, outcome: &mut ValidationOutcome) {
    let options = &request.options;
    if options.template_overrides.is_some() {
        outcome.warning("options.templateOverrides is not available in this environment and was ignored");
    }
    if options.output_directory.is_some() {
        outcome.warning("options.outputDirectory is not available in this environment and was ignored");
    }
    if options.write_files {
        outcome.warning("options.writeFiles is not available in this environment; artifacts are returned inline");
    }
}

/// Operation id if present, otherwise `METHOD path`.
pub(crate) fn endpoint_label(endpoint: &Endpoint) -> String {
    match endpoint.operation_id() {
        Some(op) => op.to_string(),
        None => format!("{} {}", endpoint.method.as_str(), endpoint.path),
    }
}

/// Missing, empty or whitespace-only.
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
