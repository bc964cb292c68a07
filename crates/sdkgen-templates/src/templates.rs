//! Template sets: one YAML document per target language.
//!
//! A set lists the files of a client package, each with a handlebars path and
//! body, plus handlebars strings for the build/test/publish commands and the
//! registry URL.

use crate::TemplateError;
use sdkgen_core::Language;
use serde::Deserialize;

const EMBEDDED: [(&str, &str); 5] = [
    ("typescript.yaml", include_str!("../templates/typescript.yaml")),
    ("python.yaml", include_str!("../templates/python.yaml")),
    ("go.yaml", include_str!("../templates/go.yaml")),
    ("java.yaml", include_str!("../templates/java.yaml")),
    ("rust.yaml", include_str!("../templates/rust.yaml")),
];

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSet {
    pub language: Language,
    pub description: String,
    #[serde(default)]
    pub commands: Commands,
    #[serde(default)]
    pub registry: Option<String>,
    pub files: Vec<FileTemplate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Commands {
    #[serde(default)]
    pub build: Option<String>,
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default)]
    pub publish: Option<String>,
}

/// One generated file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileTemplate {
    /// Handlebars template for the relative output path.
    pub path: String,
    #[serde(default)]
    pub description: Option<String>,
    pub template: String,
}

impl TemplateSet {
    /// Parses a template set from YAML content.
    pub fn from_yaml(yaml: &str) -> Result<Self, TemplateError> {
        let set: TemplateSet =
            serde_yaml::from_str(yaml).map_err(|e| TemplateError::Parse(e.to_string()))?;
        if set.files.is_empty() {
            return Err(TemplateError::Parse(format!(
                "template set for {} declares no files",
                set.language
            )));
        }
        Ok(set)
    }

    /// Loads a template set from a file on disk.
    pub fn load(path: &str) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TemplateError::Load(format!("{}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    /// The sets compiled into this crate, one per supported language.
    pub fn embedded() -> Result<Vec<Self>, TemplateError> {
        EMBEDDED
            .iter()
            .map(|(name, yaml)| {
                Self::from_yaml(yaml)
                    .map_err(|e| TemplateError::Parse(format!("{}: {}", name, e)))
            })
            .collect()
    }
}
