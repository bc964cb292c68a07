//! In-process generation orchestrator backed by the template sets.
use crate::model;
use crate::renderer::LanguageRenderer;
use crate::templates::TemplateSet;
use crate::TemplateError;
use async_trait::async_trait;
use sdkgen_core::{
    CanonicalSchema, GenerateOptions, GenerationOrchestrator, GenerationOutcome, Language,
    LanguageResult, OrchestratorError,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

pub struct TemplateOrchestrator {
    renderers: BTreeMap<Language, Arc<LanguageRenderer>>,
}

impl TemplateOrchestrator {
    /// Orchestrator over the embedded template sets.
    pub fn new() -> Result<Self, TemplateError> {
        Self::from_sets(TemplateSet::embedded()?)
    }

    /// Later sets replace earlier ones for the same language.
    pub fn from_sets(sets: Vec<TemplateSet>) -> Result<Self, TemplateError> {
        let mut renderers = BTreeMap::new();
        for set in &sets {
            renderers.insert(set.language, Arc::new(LanguageRenderer::new(set)?));
        }
        Ok(Self { renderers })
    }

    pub fn languages(&self) -> Vec<Language> {
        self.renderers.keys().copied().collect()
    }

    /// Renders one language. Render failures land in the result's errors.
    pub fn render_language(
        &self,
        language: Language,
        schema: &CanonicalSchema,
        options: &GenerateOptions,
    ) -> Result<LanguageResult, OrchestratorError> {
        let renderer = self
            .renderers
            .get(&language)
            .ok_or(OrchestratorError::UnsupportedLanguage(language))?;
        Ok(render_one(renderer, schema, options))
    }
}

fn render_one(
    renderer: &LanguageRenderer,
    schema: &CanonicalSchema,
    options: &GenerateOptions,
) -> LanguageResult {
    let started = Instant::now();
    let language = renderer.language();
    let model = model::build(language, schema, options);

    let mut result = match renderer.render(&model.data) {
        Ok(package) => LanguageResult {
            files: package.files,
            build_command: package.build_command,
            test_command: package.test_command,
            publish_command: package.publish_command,
            registry_url: package.registry_url,
            warnings: model.warnings,
            errors: Vec::new(),
            duration_ms: 0,
        },
        Err(e) => {
            tracing::warn!(language = %language, error = %e, "template rendering failed");
            LanguageResult {
                warnings: model.warnings,
                errors: vec![e.to_string()],
                ..LanguageResult::default()
            }
        }
    };
    result.duration_ms = started.elapsed().as_millis() as u64;
    tracing::debug!(
        language = %language,
        files = result.files.len(),
        duration_ms = result.duration_ms,
        "language rendered"
    );
    result
}

#[async_trait]
impl GenerationOrchestrator for TemplateOrchestrator {
    async fn generate(
        &self,
        schema: &CanonicalSchema,
        options: &GenerateOptions,
    ) -> Result<GenerationOutcome, OrchestratorError> {
        if options.languages.is_empty() {
            return Err(OrchestratorError::Internal(
                "no target languages requested".to_string(),
            ));
        }
        let mut selected = Vec::with_capacity(options.languages.len());
        for language in &options.languages {
            let renderer = self
                .renderers
                .get(language)
                .ok_or(OrchestratorError::UnsupportedLanguage(*language))?;
            if !selected.iter().any(|(l, _)| l == language) {
                selected.push((*language, Arc::clone(renderer)));
            }
        }

        let mut outcome = GenerationOutcome::default();

        if !options.parallel || selected.len() == 1 {
            for (language, renderer) in selected {
                outcome
                    .results
                    .insert(language, render_one(&renderer, schema, options));
            }
            return Ok(outcome);
        }

        let schema = Arc::new(schema.clone());
        let options = Arc::new(options.clone());
        let mut tasks = JoinSet::new();
        for (language, renderer) in selected {
            let schema = Arc::clone(&schema);
            let options = Arc::clone(&options);
            tasks.spawn_blocking(move || (language, render_one(&renderer, &schema, &options)));
        }
        while let Some(joined) = tasks.join_next().await {
            let (language, result) =
                joined.map_err(|e| OrchestratorError::Internal(e.to_string()))?;
            outcome.results.insert(language, result);
        }
        Ok(outcome)
    }
}
