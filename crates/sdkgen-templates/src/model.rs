//! Render context: the schema reshaped into per-language template data.
use crate::naming::{
    argument_name, kebab_case, member_name, method_name, pascal_case, screaming_case,
    snake_case,
};
use crate::types::{declared_name, fallback, is_declared, optional, primitive, TypeMapper};
use once_cell::sync::Lazy;
use regex::Regex;
use sdkgen_core::{
    AuthSchemeKind, CanonicalSchema, Endpoint, GenerateOptions, Language, ParameterLocation,
    TypeDefinition, TypeKind, AGENT_ID, AGENT_VERSION,
};
use serde_json::{json, Value};

static PATH_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}/]+)\}").expect("path parameter regex"));

/// Template data for one language plus the warnings found while shaping it.
pub struct LanguageModel {
    pub data: Value,
    pub warnings: Vec<String>,
}

pub fn build(
    language: Language,
    schema: &CanonicalSchema,
    options: &GenerateOptions,
) -> LanguageModel {
    let mapper = TypeMapper::new(language, schema);
    let mut warnings = Vec::new();

    let types: Vec<Value> = schema
        .types
        .iter()
        .inspect(|def| type_warnings(language, &mapper, def, &mut warnings))
        .filter(|def| is_declared(language, def))
        .map(|def| type_data(&mapper, def))
        .collect();

    let type_names: Vec<String> = schema
        .types
        .iter()
        .filter(|def| is_declared(language, def))
        .map(declared_name)
        .collect();

    let endpoints: Vec<Value> = schema
        .endpoints
        .iter()
        .map(|endpoint| endpoint_data(&mapper, endpoint))
        .collect();

    let auth: Vec<Value> = schema
        .auth_schemes
        .iter()
        .map(|scheme| {
            let kind = match scheme.kind {
                AuthSchemeKind::ApiKey => "apiKey",
                AuthSchemeKind::Http => "http",
                AuthSchemeKind::OAuth2 => "oauth2",
                AuthSchemeKind::OpenIdConnect => "openIdConnect",
            };
            json!({
                "id": scheme.id().unwrap_or_default(),
                "kind": kind,
                "description": scheme.description,
                "headerName": scheme.header_name,
                "scheme": scheme.scheme,
            })
        })
        .collect();

    let name = options.package_name.as_str();
    let description = options
        .package_description
        .clone()
        .or_else(|| schema.metadata.description.clone())
        .unwrap_or_else(|| format!("Client library for {}", name));
    let flat: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    let flat = if flat.is_empty() { "client".to_string() } else { flat };

    let data = json!({
        "language": language.as_str(),
        "package": {
            "name": name,
            "version": options.package_version,
            "description": description,
            "snake": snake_case(name),
            "kebab": kebab_case(name),
            "pascal": pascal_case(name),
            "flat": flat,
        },
        "schema": {
            "title": schema.metadata.title.clone().unwrap_or_else(|| name.to_string()),
            "description": schema.metadata.description,
            "version": schema.metadata.version,
            "baseUrl": schema.metadata.base_url.clone().unwrap_or_default(),
        },
        "types": types,
        "hasTypes": !types.is_empty(),
        "typeNames": type_names,
        "endpoints": endpoints,
        "auth": auth,
        "generator": { "id": AGENT_ID, "version": AGENT_VERSION },
    });

    LanguageModel { data, warnings }
}

fn type_warnings(
    language: Language,
    mapper: &TypeMapper<'_>,
    def: &TypeDefinition,
    warnings: &mut Vec<String>,
) {
    match def.kind {
        TypeKind::Union if !language.has_sum_types() => warnings.push(format!(
            "type '{}' is a union; {} has no native sum types, encoded as {}",
            def.name,
            language,
            mapper.definition(def)
        )),
        TypeKind::Other => warnings.push(format!(
            "type '{}' has an unrecognized kind, mapped to {}",
            def.name,
            fallback(language)
        )),
        _ => {}
    }
}

fn type_data(mapper: &TypeMapper<'_>, def: &TypeDefinition) -> Value {
    let language = mapper.language();
    let name = declared_name(def);

    let mut fields: Vec<Value> = def
        .properties
        .iter()
        .map(|prop| {
            let base = mapper.reference(&prop.type_ref);
            let member = member_name(language, &prop.name);
            let expr = if prop.required {
                base.clone()
            } else {
                optional(language, &base)
            };
            let renamed = member != prop.name;
            json!({
                "name": member,
                "wireName": prop.name,
                "renamed": renamed,
                "baseType": base,
                "typeExpr": expr,
                "required": prop.required,
                "description": prop.description,
            })
        })
        .collect();
    if language == Language::Python {
        // Dataclass fields without defaults must come first.
        fields.sort_by_key(|f| !f["required"].as_bool().unwrap_or(false));
    }

    let values: Vec<Value> = def
        .values
        .iter()
        .map(|wire| {
            let member = match language {
                Language::Go => format!("{}{}", name, pascal_case(wire)),
                Language::Rust => pascal_case(wire),
                Language::Typescript | Language::Python | Language::Java => screaming_case(wire),
            };
            json!({ "name": member, "wire": wire })
        })
        .collect();

    let variants: Vec<Value> = def
        .variants
        .iter()
        .map(|v| json!({ "name": mapper.variant_name(v), "typeExpr": mapper.reference(v) }))
        .collect();

    json!({
        "name": name,
        "wireName": def.name,
        "kind": def.kind.to_string(),
        "description": def.description,
        "deprecated": def.deprecated,
        "deprecationMessage": def.deprecation_message,
        "isObject": def.kind == TypeKind::Object,
        "isEnum": def.kind == TypeKind::Enum,
        "isUnion": def.kind == TypeKind::Union && language.has_sum_types(),
        "isAlias": matches!(def.kind, TypeKind::Primitive | TypeKind::Array | TypeKind::Other)
            || (def.kind == TypeKind::Union && !language.has_sum_types()),
        "aliasOf": mapper.definition(def),
        "fields": fields,
        "hasFields": !def.properties.is_empty(),
        "values": values,
        "variants": variants,
    })
}

fn endpoint_data(mapper: &TypeMapper<'_>, endpoint: &Endpoint) -> Value {
    let language = mapper.language();
    let operation = endpoint
        .operation_id()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", endpoint.method.as_str().to_lowercase(), endpoint.path));

    let param = |p: &sdkgen_core::Parameter| {
        let expr = primitive(language, p.primitive.as_deref().unwrap_or("string"));
        json!({
            "name": argument_name(language, &p.name),
            "wireName": p.name,
            "typeExpr": expr,
            "required": p.required,
            "description": p.description,
        })
    };
    let path_params: Vec<Value> = endpoint
        .parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Path)
        .map(param)
        .collect();
    let query_params: Vec<Value> = endpoint
        .parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Query)
        .map(param)
        .collect();

    let body_type = endpoint
        .request_body
        .as_ref()
        .map(|body| mapper.reference(&body.type_ref));
    let return_type = endpoint.success_type().map(|t| mapper.reference(t));

    // Flat argument list for languages whose templates need a comma-joined signature.
    let mut args: Vec<Value> = path_params
        .iter()
        .map(|p| json!({ "name": p["name"], "typeExpr": p["typeExpr"] }))
        .collect();
    if let Some(body) = &body_type {
        let expr = if language == Language::Rust {
            format!("&{}", body)
        } else {
            body.clone()
        };
        args.push(json!({ "name": "body", "typeExpr": expr }));
    }
    for q in &query_params {
        let base = q["typeExpr"].as_str().unwrap_or_default();
        args.push(json!({ "name": q["name"], "typeExpr": optional(language, base) }));
    }

    json!({
        "name": method_name(language, &operation),
        "operationId": operation,
        "method": endpoint.method.as_str(),
        "path": endpoint.path,
        "pathExpr": path_expr(language, &endpoint.path),
        "summary": endpoint.summary.as_ref().or(endpoint.description.as_ref()),
        "deprecated": endpoint.deprecated,
        "deprecationMessage": endpoint.deprecation_message,
        "pathParams": path_params,
        "args": args,
        "queryParams": query_params,
        "hasQuery": !query_params.is_empty(),
        "hasBody": body_type.is_some(),
        "bodyType": body_type,
        "contentType": endpoint
            .request_body
            .as_ref()
            .and_then(|b| b.content_type.clone())
            .unwrap_or_else(|| "application/json".to_string()),
        "hasReturn": return_type.is_some(),
        "returnType": return_type,
    })
}

/// Source expression that builds the request path in `language`.
pub fn path_expr(language: Language, path: &str) -> String {
    let mut literal_parts = Vec::new();
    let mut params = Vec::new();
    let mut last = 0;
    for caps in PATH_PARAM.captures_iter(path) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        literal_parts.push(&path[last..whole.start()]);
        params.push(argument_name(language, name.as_str()));
        last = whole.end();
    }
    let tail = &path[last..];

    match language {
        Language::Typescript => {
            let mut out = String::from("`");
            for (lit, p) in literal_parts.iter().zip(&params) {
                out.push_str(lit);
                out.push_str(&format!("${{encodeURIComponent(String({}))}}", p));
            }
            out.push_str(tail);
            out.push('`');
            out
        }
        Language::Python => {
            let mut out = String::from("f\"");
            for (lit, p) in literal_parts.iter().zip(&params) {
                out.push_str(lit);
                out.push_str(&format!("{{quote(str({}), safe='')}}", p));
            }
            out.push_str(tail);
            out.push('"');
            out
        }
        Language::Go | Language::Java => {
            let escape: fn(&str) -> String = if language == Language::Go {
                |p: &str| format!("url.PathEscape(fmt.Sprint({}))", p)
            } else {
                |p: &str| format!("encode(String.valueOf({}))", p)
            };
            let mut pieces = Vec::new();
            for (lit, p) in literal_parts.iter().zip(&params) {
                if !lit.is_empty() {
                    pieces.push(format!("\"{}\"", lit));
                }
                pieces.push(escape(p));
            }
            if !tail.is_empty() || pieces.is_empty() {
                pieces.push(format!("\"{}\"", tail));
            }
            pieces.join(" + ")
        }
        Language::Rust => {
            if params.is_empty() {
                return format!("\"{}\".to_string()", path);
            }
            let mut template = String::new();
            for lit in &literal_parts {
                template.push_str(lit);
                template.push_str("{}");
            }
            template.push_str(tail);
            let args: Vec<String> = params.iter().map(|p| format!("encode({})", p)).collect();
            format!("format!(\"{}\", {})", template, args.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_expressions() {
        let path = "/pets/{petId}/photos";
        assert_eq!(
            path_expr(Language::Typescript, path),
            "`/pets/${encodeURIComponent(String(petId))}/photos`"
        );
        assert_eq!(
            path_expr(Language::Python, path),
            "f\"/pets/{quote(str(pet_id), safe='')}/photos\""
        );
        assert_eq!(
            path_expr(Language::Go, path),
            "\"/pets/\" + url.PathEscape(fmt.Sprint(petId)) + \"/photos\""
        );
        assert_eq!(
            path_expr(Language::Rust, path),
            "format!(\"/pets/{}/photos\", encode(pet_id))"
        );
        assert_eq!(path_expr(Language::Java, "/pets"), "\"/pets\"");
        assert_eq!(path_expr(Language::Rust, "/pets"), "\"/pets\".to_string()");
    }
}
