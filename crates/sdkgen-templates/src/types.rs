//! Per-language type expressions for canonical schema types.
use crate::naming::pascal_case;
use sdkgen_core::{CanonicalSchema, Language, TypeDefinition, TypeKind};

/// Type expression for a primitive name such as `string` or `date-time`.
pub fn primitive(language: Language, name: &str) -> &'static str {
    let key = name.trim().to_ascii_lowercase();
    match language {
        Language::Typescript => match key.as_str() {
            "string" | "date" | "date-time" | "uuid" | "uri" | "email" => "string",
            "integer" | "int" | "int32" | "int64" | "float" | "double" | "number" => "number",
            "boolean" | "bool" => "boolean",
            "null" => "null",
            "binary" | "bytes" => "Blob",
            _ => "unknown",
        },
        Language::Python => match key.as_str() {
            "string" | "date" | "date-time" | "uuid" | "uri" | "email" => "str",
            "integer" | "int" | "int32" | "int64" => "int",
            "float" | "double" | "number" => "float",
            "boolean" | "bool" => "bool",
            "null" => "None",
            "binary" | "bytes" => "bytes",
            _ => "Any",
        },
        Language::Go => match key.as_str() {
            "string" | "date" | "date-time" | "uuid" | "uri" | "email" => "string",
            "integer" | "int" | "int64" => "int64",
            "int32" => "int32",
            "float" | "double" | "number" => "float64",
            "boolean" | "bool" => "bool",
            "binary" | "bytes" => "[]byte",
            _ => "interface{}",
        },
        Language::Java => match key.as_str() {
            "string" | "date" | "date-time" | "uuid" | "uri" | "email" => "String",
            "integer" | "int" | "int64" => "Long",
            "int32" => "Integer",
            "float" | "double" | "number" => "Double",
            "boolean" | "bool" => "Boolean",
            "binary" | "bytes" => "byte[]",
            _ => "Object",
        },
        Language::Rust => match key.as_str() {
            "string" | "date" | "date-time" | "uuid" | "uri" | "email" => "String",
            "integer" | "int" | "int64" => "i64",
            "int32" => "i32",
            "float" | "double" | "number" => "f64",
            "boolean" | "bool" => "bool",
            "null" => "()",
            "binary" | "bytes" => "Vec<u8>",
            _ => "serde_json::Value",
        },
    }
}

/// Catch-all type for unknown references and unrecognized kinds.
pub fn fallback(language: Language) -> &'static str {
    match language {
        Language::Typescript => "unknown",
        Language::Python => "Any",
        Language::Go => "interface{}",
        Language::Java => "Object",
        Language::Rust => "serde_json::Value",
    }
}

pub fn list_of(language: Language, item: &str) -> String {
    match language {
        Language::Typescript => format!("Array<{}>", item),
        Language::Python => format!("List[{}]", item),
        Language::Go => format!("[]{}", item),
        Language::Java => format!("List<{}>", item),
        Language::Rust => format!("Vec<{}>", item),
    }
}

/// Wraps `expr` for a field that may be absent.
pub fn optional(language: Language, expr: &str) -> String {
    match language {
        Language::Typescript | Language::Java => expr.to_string(),
        Language::Python => format!("Optional[{}]", expr),
        Language::Go if expr.starts_with("[]") || expr == "interface{}" => expr.to_string(),
        Language::Go => format!("*{}", expr),
        Language::Rust => format!("Option<{}>", expr),
    }
}

/// Name a type definition is declared under.
pub fn declared_name(def: &TypeDefinition) -> String {
    pascal_case(&def.name)
}

/// Whether `def` is emitted as its own declaration in `language`.
///
/// Java has no type aliases, so primitives, arrays and unions are inlined at
/// the point of use.
pub fn is_declared(language: Language, def: &TypeDefinition) -> bool {
    match def.kind {
        TypeKind::Object | TypeKind::Enum => true,
        TypeKind::Primitive | TypeKind::Array | TypeKind::Union | TypeKind::Other => {
            language != Language::Java
        }
    }
}

/// Resolves type references against one schema for one language.
pub struct TypeMapper<'a> {
    language: Language,
    schema: &'a CanonicalSchema,
}

impl<'a> TypeMapper<'a> {
    pub fn new(language: Language, schema: &'a CanonicalSchema) -> Self {
        Self { language, schema }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Expression for a reference to type id `type_ref`.
    pub fn reference(&self, type_ref: &str) -> String {
        self.reference_at(type_ref, 0)
    }

    fn reference_at(&self, type_ref: &str, depth: usize) -> String {
        match self.schema.find_type(type_ref) {
            Some(def) if is_declared(self.language, def) => declared_name(def),
            Some(def) if depth < 8 => self.definition_at(def, depth + 1),
            _ => fallback(self.language).to_string(),
        }
    }

    /// Right-hand side of an alias declaration for `def`.
    pub fn definition(&self, def: &TypeDefinition) -> String {
        self.definition_at(def, 0)
    }

    fn definition_at(&self, def: &TypeDefinition, depth: usize) -> String {
        match def.kind {
            TypeKind::Primitive => {
                primitive(self.language, def.primitive.as_deref().unwrap_or("")).to_string()
            }
            TypeKind::Array => {
                let item = def
                    .items
                    .as_deref()
                    .map(|i| self.reference_at(i, depth))
                    .unwrap_or_else(|| fallback(self.language).to_string());
                list_of(self.language, &item)
            }
            TypeKind::Union => self.union_at(def, depth),
            TypeKind::Object | TypeKind::Enum => declared_name(def),
            TypeKind::Other => fallback(self.language).to_string(),
        }
    }

    fn union_at(&self, def: &TypeDefinition, depth: usize) -> String {
        let variants: Vec<String> = def
            .variants
            .iter()
            .map(|v| self.reference_at(v, depth))
            .collect();
        match self.language {
            Language::Typescript if !variants.is_empty() => variants.join(" | "),
            Language::Python if !variants.is_empty() => format!("Union[{}]", variants.join(", ")),
            // Rust declares unions as untagged enums; the alias form is unused.
            Language::Rust => declared_name(def),
            _ => fallback(self.language).to_string(),
        }
    }

    /// Expression for one union variant inside a Rust enum.
    pub fn variant_name(&self, type_ref: &str) -> String {
        match self.schema.find_type(type_ref) {
            Some(def) => declared_name(def),
            None => pascal_case(type_ref),
        }
    }

    /// Whether `type_ref` resolves to a declared type in this schema.
    pub fn resolves(&self, type_ref: &str) -> bool {
        self.schema.find_type(type_ref).is_some()
    }
}
