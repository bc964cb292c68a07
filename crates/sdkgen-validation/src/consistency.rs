//! Schema-level consistency: the type/endpoint/auth graph of a
//! `CanonicalSchema`, checked independently of request validation.
//!
//! Response-body references are deliberately not checked here; an unresolved
//! response type is a warning at the request level.
use crate::semantic::is_blank;
use sdkgen_core::{CanonicalSchema, TypeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One consistency problem, located by a JSON-path-like string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    pub path: String,
    pub message: String,
}

impl SchemaIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Checks the internal consistency of `schema`.
pub fn check_schema(schema: &CanonicalSchema) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();

    if is_blank(schema.metadata.version.as_deref()) {
        issues.push(SchemaIssue::new("metadata.version", "required"));
    }
    if is_blank(schema.metadata.provider_id.as_deref()) {
        issues.push(SchemaIssue::new("metadata.providerId", "required"));
    }

    let type_ids = schema.type_ids();
    let mut seen = HashSet::new();
    for (i, def) in schema.types.iter().enumerate() {
        let base = format!("types[{i}]");
        match def.id() {
            None => issues.push(SchemaIssue::new(format!("{base}.id"), "missing")),
            Some(id) if !seen.insert(id) => {
                issues.push(SchemaIssue::new(format!("{base}.id"), format!("duplicate '{id}'")))
            }
            Some(_) => {}
        }

        for (j, prop) in def.properties.iter().enumerate() {
            if !type_ids.contains(prop.type_ref.as_str()) {
                issues.push(SchemaIssue::new(
                    format!("{base}.properties[{j}].typeRef"),
                    format!("unknown type '{}'", prop.type_ref),
                ));
            }
        }

        match def.kind {
            TypeKind::Array => match def.items.as_deref() {
                None => issues.push(SchemaIssue::new(
                    format!("{base}.items"),
                    "array type requires an item type",
                )),
                Some(items) if !type_ids.contains(items) => issues.push(SchemaIssue::new(
                    format!("{base}.items"),
                    format!("unknown type '{items}'"),
                )),
                Some(_) => {}
            },
            TypeKind::Union => {
                if def.variants.is_empty() {
                    issues.push(SchemaIssue::new(
                        format!("{base}.variants"),
                        "union type requires at least one variant",
                    ));
                }
                for (j, variant) in def.variants.iter().enumerate() {
                    if !type_ids.contains(variant.as_str()) {
                        issues.push(SchemaIssue::new(
                            format!("{base}.variants[{j}]"),
                            format!("unknown type '{variant}'"),
                        ));
                    }
                }
            }
            TypeKind::Enum => {
                if def.values.is_empty() {
                    issues.push(SchemaIssue::new(
                        format!("{base}.values"),
                        "enum type requires at least one value",
                    ));
                }
            }
            TypeKind::Primitive | TypeKind::Object | TypeKind::Other => {}
        }
    }

    let mut operations = HashSet::new();
    for (i, endpoint) in schema.endpoints.iter().enumerate() {
        let base = format!("endpoints[{i}]");
        match endpoint.operation_id() {
            None => issues.push(SchemaIssue::new(format!("{base}.operationId"), "missing")),
            Some(op) if !operations.insert(op) => issues.push(SchemaIssue::new(
                format!("{base}.operationId"),
                format!("duplicate '{op}'"),
            )),
            Some(_) => {}
        }
        if let Some(body) = &endpoint.request_body {
            if !type_ids.contains(body.type_ref.as_str()) {
                issues.push(SchemaIssue::new(
                    format!("{base}.requestBody.typeRef"),
                    format!("unknown type '{}'", body.type_ref),
                ));
            }
        }
    }

    let mut schemes = HashSet::new();
    for (i, scheme) in schema.auth_schemes.iter().enumerate() {
        let path = format!("authSchemes[{i}].id");
        match scheme.id() {
            None => issues.push(SchemaIssue::new(path, "missing")),
            Some(id) if !schemes.insert(id) => {
                issues.push(SchemaIssue::new(path, format!("duplicate '{id}'")))
            }
            Some(_) => {}
        }
    }

    for (i, error) in schema.errors.iter().enumerate() {
        if let Some(type_ref) = &error.type_ref {
            if !type_ids.contains(type_ref.as_str()) {
                issues.push(SchemaIssue::new(
                    format!("errors[{i}].typeRef"),
                    format!("unknown type '{type_ref}'"),
                ));
            }
        }
    }

    issues
}
