//! Handlebars renderer for one template set.
//!
//! Registered helpers:
//! - `pascal`, `camel`, `snake`, `kebab`, `screaming`: identifier casing
//! - `join`: join an array of strings with a separator
//! - `quote`: render a value as a double-quoted string literal

use crate::naming;
use crate::templates::TemplateSet;
use crate::TemplateError;
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
};
use sdkgen_core::{GeneratedFile, Language};
use serde_json::Value;

/// Rendered package for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPackage {
    pub files: Vec<GeneratedFile>,
    pub build_command: Option<String>,
    pub test_command: Option<String>,
    pub publish_command: Option<String>,
    pub registry_url: Option<String>,
}

/// Compiled template set with helpers registered.
pub struct LanguageRenderer {
    language: Language,
    handlebars: Handlebars<'static>,
    file_count: usize,
    has_build: bool,
    has_test: bool,
    has_publish: bool,
    has_registry: bool,
}

impl LanguageRenderer {
    pub fn new(set: &TemplateSet) -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("pascal", Box::new(CaseHelper(naming::pascal_case)));
        handlebars.register_helper("camel", Box::new(CaseHelper(naming::camel_case)));
        handlebars.register_helper("snake", Box::new(CaseHelper(naming::snake_case)));
        handlebars.register_helper("kebab", Box::new(CaseHelper(naming::kebab_case)));
        handlebars.register_helper("screaming", Box::new(CaseHelper(naming::screaming_case)));
        handlebars.register_helper("join", Box::new(JoinHelper));
        handlebars.register_helper("quote", Box::new(QuoteHelper));

        let mut register = |name: String, source: &str| {
            handlebars
                .register_template_string(&name, source)
                .map_err(|e| TemplateError::Compile {
                    template: format!("{}/{}", set.language, name),
                    message: e.to_string(),
                })
        };

        for (i, file) in set.files.iter().enumerate() {
            register(format!("path:{}", i), &file.path)?;
            register(format!("body:{}", i), &file.template)?;
        }
        let commands = [
            ("build", set.commands.build.as_deref()),
            ("test", set.commands.test.as_deref()),
            ("publish", set.commands.publish.as_deref()),
            ("registry", set.registry.as_deref()),
        ];
        for (name, source) in commands {
            if let Some(source) = source {
                register(name.to_string(), source)?;
            }
        }

        Ok(Self {
            language: set.language,
            handlebars,
            file_count: set.files.len(),
            has_build: set.commands.build.is_some(),
            has_test: set.commands.test.is_some(),
            has_publish: set.commands.publish.is_some(),
            has_registry: set.registry.is_some(),
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn render_named(&self, name: &str, data: &Value) -> Result<String, TemplateError> {
        self.handlebars
            .render(name, data)
            .map_err(|e| TemplateError::Render {
                template: format!("{}/{}", self.language, name),
                message: e.to_string(),
            })
    }

    fn render_optional(
        &self,
        present: bool,
        name: &str,
        data: &Value,
    ) -> Result<Option<String>, TemplateError> {
        if !present {
            return Ok(None);
        }
        let rendered = self.render_named(name, data)?;
        let trimmed = rendered.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    /// Renders every file and command against `data`.
    pub fn render(&self, data: &Value) -> Result<RenderedPackage, TemplateError> {
        let mut files = Vec::with_capacity(self.file_count);
        for i in 0..self.file_count {
            let path = self.render_named(&format!("path:{}", i), data)?;
            let path = path.trim();
            if path.is_empty() || path.starts_with('/') || path.split('/').any(|s| s == "..") {
                return Err(TemplateError::Render {
                    template: format!("{}/path:{}", self.language, i),
                    message: format!("invalid output path '{}'", path),
                });
            }
            let content = self.render_named(&format!("body:{}", i), data)?;
            files.push(GeneratedFile::new(path, content));
        }

        Ok(RenderedPackage {
            files,
            build_command: self.render_optional(self.has_build, "build", data)?,
            test_command: self.render_optional(self.has_test, "test", data)?,
            publish_command: self.render_optional(self.has_publish, "publish", data)?,
            registry_url: self.render_optional(self.has_registry, "registry", data)?,
        })
    }
}

// ============================================================================
// Custom Helpers
// ============================================================================

/// Applies an identifier casing to its first parameter.
struct CaseHelper(fn(&str) -> String);

impl HelperDef for CaseHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
        out.write(&(self.0)(text))?;
        Ok(())
    }
}

/// Join an array with a separator (default ", ").
struct JoinHelper;

impl HelperDef for JoinHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let items: Vec<String> = h
            .param(0)
            .and_then(|v| v.value().as_array())
            .map(|arr| {
                arr.iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let separator = h.param(1).and_then(|v| v.value().as_str()).unwrap_or(", ");
        out.write(&items.join(separator))?;
        Ok(())
    }
}

/// Renders a JSON-escaped, double-quoted string literal.
struct QuoteHelper;

impl HelperDef for QuoteHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = match h.param(0).map(|v| v.value()) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        out.write(&Value::String(text).to_string())?;
        Ok(())
    }
}
