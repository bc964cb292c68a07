//! Identifier casing and escaping for generated code.
use once_cell::sync::Lazy;
use regex::Regex;
use sdkgen_core::Language;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("separator regex"));

/// Splits an identifier into lowercase words on separators and case changes.
///
/// `HTTPServer_v2-id` becomes `["http", "server", "v2", "id"]`.
pub fn words(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    for chunk in SEPARATORS.split(input).filter(|c| !c.is_empty()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_ascii_uppercase() {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).map_or(false, |n| n.is_ascii_lowercase());
                if prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_lower)
                {
                    out.push(std::mem::take(&mut current));
                }
            }
            current.push(c.to_ascii_lowercase());
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub fn pascal_case(input: &str) -> String {
    let joined: String = words(input).iter().map(|w| capitalize(w)).collect();
    leading_digit_guard(joined, "T")
}

pub fn camel_case(input: &str) -> String {
    let words = words(input);
    let mut out = String::new();
    for (i, w) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(w);
        } else {
            out.push_str(&capitalize(w));
        }
    }
    leading_digit_guard(out, "v")
}

pub fn snake_case(input: &str) -> String {
    leading_digit_guard(words(input).join("_"), "v")
}

pub fn kebab_case(input: &str) -> String {
    words(input).join("-")
}

pub fn screaming_case(input: &str) -> String {
    leading_digit_guard(words(input).join("_").to_ascii_uppercase(), "V")
}

fn leading_digit_guard(ident: String, prefix: &str) -> String {
    if ident.is_empty() {
        return format!("{}_", prefix);
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{}{}", prefix, ident)
    } else {
        ident
    }
}

const TYPESCRIPT_RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with",
];

const PYTHON_RESERVED: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "False", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "None", "nonlocal", "not", "or", "pass", "raise", "return", "True",
    "try", "while", "with", "yield", "self",
];

const GO_RESERVED: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

const JAVA_RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "default", "do", "double", "else", "enum", "extends", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
    "throw", "throws", "transient", "try", "void", "volatile", "while",
];

const RUST_RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe",
    "use", "where", "while", "yield",
];

/// Escapes `ident` if it collides with a keyword of `language`.
pub fn escape_keyword(language: Language, ident: String) -> String {
    let reserved = match language {
        Language::Typescript => TYPESCRIPT_RESERVED,
        Language::Python => PYTHON_RESERVED,
        Language::Go => GO_RESERVED,
        Language::Java => JAVA_RESERVED,
        Language::Rust => RUST_RESERVED,
    };
    if !reserved.contains(&ident.as_str()) {
        return ident;
    }
    match language {
        Language::Rust if !matches!(ident.as_str(), "self" | "crate" | "super") => {
            format!("r#{}", ident)
        }
        _ => format!("{}_", ident),
    }
}

/// Field or parameter name in the idiom of `language`.
pub fn member_name(language: Language, wire: &str) -> String {
    let ident = match language {
        Language::Python | Language::Rust => snake_case(wire),
        Language::Go => pascal_case(wire),
        Language::Typescript | Language::Java => camel_case(wire),
    };
    escape_keyword(language, ident)
}

/// Local variable or argument name in the idiom of `language`.
pub fn argument_name(language: Language, wire: &str) -> String {
    let ident = match language {
        Language::Python | Language::Rust => snake_case(wire),
        Language::Go | Language::Typescript | Language::Java => camel_case(wire),
    };
    escape_keyword(language, ident)
}

/// Client method name for an operation id.
pub fn method_name(language: Language, operation_id: &str) -> String {
    let ident = match language {
        Language::Python | Language::Rust => snake_case(operation_id),
        Language::Go => pascal_case(operation_id),
        Language::Typescript | Language::Java => camel_case(operation_id),
    };
    escape_keyword(language, ident)
}
