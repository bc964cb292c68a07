//! Supported target languages.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fully supported target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Typescript,
    Python,
    Go,
    Java,
    Rust,
}

impl Language {
    /// Every fully supported language, in canonical order.
    pub const ALL: [Language; 5] = [
        Language::Typescript,
        Language::Python,
        Language::Go,
        Language::Java,
        Language::Rust,
    ];

    /// Canonical lowercase tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Typescript => "typescript",
            Language::Python => "python",
            Language::Go => "go",
            Language::Java => "java",
            Language::Rust => "rust",
        }
    }

    /// Accepted shorthand spellings.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Language::Typescript => &["ts"],
            Language::Python => &["py"],
            Language::Go => &["golang"],
            Language::Java => &[],
            Language::Rust => &["rs"],
        }
    }

    /// Whether the language has native sum types.
    pub fn has_sum_types(&self) -> bool {
        matches!(self, Language::Typescript | Language::Rust)
    }

    /// Maps raw requested tags to languages, keeping first-seen order and
    /// dropping duplicates and unsupported values.
    pub fn dedup_supported<S: AsRef<str>>(requested: &[S]) -> Vec<Language> {
        let mut out = Vec::new();
        for raw in requested {
            if let Ok(lang) = raw.as_ref().parse::<Language>() {
                if !out.contains(&lang) {
                    out.push(lang);
                }
            }
        }
        out
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == needle || lang.aliases().contains(&needle.as_str()))
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}
