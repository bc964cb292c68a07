//! Pipeline handler: one generation request from raw bytes to response.
//!
//! ```text
//! RECEIVED → STRUCTURALLY_VALIDATED → SEMANTICALLY_VALIDATED → TIME_CHECKED → GENERATED → RESPONDED
//!     └──────────────────────────────┴─────────────────┴──────────────┴───────────┴──→ ABORTED
//! ```
//!
//! Every request gets its own [`EventTransport`]. Events are enqueued in
//! state order and flushed in the background; the response never waits on
//! the collector.
use crate::artifact::{self, Assembly};
use crate::config::PipelineConfig;
use crate::response::{
    Compatibility, ErrorBody, ErrorDetail, GenerationBody, PipelineResponse, ResponseBody,
    HEADER_AGENT_ID, HEADER_AGENT_VERSION, HEADER_DETERMINISM_HASH, HEADER_REQUEST_ID,
};
use chrono::{SecondsFormat, Utc};
use sdkgen_confidence::ConfidenceResult;
use sdkgen_core::{
    determinism_hash, hash_bytes, hash_canonical, GenerateOptions, GenerationOrchestrator,
    GenerationRequest, InvocationContext, Language, PipelineError,
};
use sdkgen_events::{
    Completed, CompletionStatus, DecisionEvent, EventFactory, EventSink, EventTransport,
    Initiated, LanguageGenerationDecision, TypeMappingDecision,
};
use sdkgen_validation::{check_schema, parse_request, SemanticValidator};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Received,
    StructurallyValidated,
    SemanticallyValidated,
    TimeChecked,
    Generated,
    Responded,
    Aborted,
}

/// A handled request: the response plus the transport still delivering its events.
pub struct Handled {
    pub response: PipelineResponse,
    /// Await [`EventTransport::drain`] to observe delivery; dropping it is fine.
    pub events: EventTransport,
}

pub struct PipelineHandler {
    orchestrator: Arc<dyn GenerationOrchestrator>,
    sink: Arc<dyn EventSink>,
    config: PipelineConfig,
}

struct Run {
    request_id: String,
    factory: EventFactory,
    events: EventTransport,
    ctx: InvocationContext,
    state: PipelineState,
    warnings: Vec<String>,
}

impl Run {
    fn advance(&mut self, next: PipelineState) {
        tracing::debug!(from = ?self.state, to = ?next, "pipeline state");
        self.state = next;
    }

    fn emit(&self, event: DecisionEvent) {
        self.events.emit(event);
    }
}

struct Generated {
    request: GenerationRequest,
    confidence: ConfidenceResult,
    assembly: Assembly,
    input_hash: String,
    output_hash: String,
    determinism_hash: String,
}

impl PipelineHandler {
    pub fn new(orchestrator: Arc<dyn GenerationOrchestrator>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            orchestrator,
            sink,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one request. Never fails: every abort becomes an error response.
    pub async fn handle(&self, body: &[u8], ctx: InvocationContext) -> Handled {
        let (mut run, span) = self.start(hash_bytes(body), ctx);
        let response = self.execute(&mut run, body).instrument(span).await;
        Handled {
            response,
            events: run.events,
        }
    }

    /// Classified 413 for a body the caller stopped reading at the ceiling.
    ///
    /// `size` is the declared or observed length. No bytes were kept, so the
    /// events carry the hash of the empty input.
    pub fn reject_oversized(&self, size: usize, ctx: InvocationContext) -> Handled {
        self.reject(
            PipelineError::PayloadTooLarge {
                size,
                limit: self.config.max_body_bytes,
            },
            ctx,
        )
    }

    /// Aborts a request whose body could not be read at all.
    pub fn reject(&self, error: PipelineError, ctx: InvocationContext) -> Handled {
        let (mut run, span) = self.start(hash_bytes(&[]), ctx);
        let _entered = span.enter();
        let response = self.abort(&mut run, error);
        let response = self.finish(&run, response);
        Handled {
            response,
            events: run.events,
        }
    }

    fn start(&self, input_hash: String, ctx: InvocationContext) -> (Run, tracing::Span) {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("generation", request_id = %request_id);
        let run = Run {
            factory: EventFactory::new(request_id.clone(), input_hash)
                .with_agent(&self.config.agent_id, &self.config.agent_version),
            request_id,
            events: EventTransport::with_config(
                Arc::clone(&self.sink),
                self.config.transport.clone(),
            ),
            ctx,
            state: PipelineState::Received,
            warnings: Vec::new(),
        };
        (run, span)
    }

    async fn execute(&self, run: &mut Run, body: &[u8]) -> PipelineResponse {
        let response = match self.run_stages(run, body).await {
            Ok(generated) => self.respond(run, generated),
            Err(error) => self.abort(run, error),
        };
        self.finish(run, response)
    }

    /// Closes every request with a telemetry event.
    fn finish(&self, run: &Run, response: PipelineResponse) -> PipelineResponse {
        let duration_ms = run.ctx.elapsed().as_millis() as u64;
        run.emit(
            run.factory
                .telemetry(duration_ms, response.status, response.failure_mode()),
        );
        tracing::info!(status = response.status, duration_ms, "request handled");
        response
    }

    async fn run_stages(&self, run: &mut Run, body: &[u8]) -> Result<Generated, PipelineError> {
        if body.len() > self.config.max_body_bytes {
            return Err(PipelineError::PayloadTooLarge {
                size: body.len(),
                limit: self.config.max_body_bytes,
            });
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| PipelineError::MalformedJson(e.to_string()))?;
        let request = parse_request(value)
            .map_err(|outcome| PipelineError::StructuralValidation(outcome.into_parts().0))?;

        let input_hash = hash_canonical(&request)?;
        run.factory.set_input_hash(input_hash.clone());
        run.factory.set_tracing(request.tracing.clone());
        run.advance(PipelineState::StructurallyValidated);

        let confidence = sdkgen_confidence::score(&request.schema, &request.target_languages);
        run.emit(run.factory.initiated(Initiated {
            target_languages: request.target_languages.clone(),
            package_name: request.package.name.clone(),
            package_version: request.package.version.clone(),
            type_count: request.schema.types.len(),
            endpoint_count: request.schema.endpoints.len(),
            confidence: confidence.score,
            confidence_semantics: confidence.semantics.as_str().to_string(),
        }));
        for mapping in confidence
            .languages
            .iter()
            .filter(|m| m.language.parse::<Language>().is_ok())
        {
            run.emit(run.factory.type_mapping_decision(TypeMappingDecision {
                language: mapping.language.clone(),
                confidence: mapping.confidence,
                exact: mapping.exact,
                approximate: mapping.approximate,
                fallback: mapping.fallback,
            }));
        }
        tracing::info!(
            confidence = confidence.score,
            semantics = confidence.semantics.as_str(),
            "request parsed"
        );

        let (errors, warnings) = SemanticValidator::new().validate(&request).into_parts();
        run.warnings.extend(warnings);
        if !errors.is_empty() {
            return Err(PipelineError::SemanticValidation(errors));
        }

        let issues = check_schema(&request.schema);
        if !issues.is_empty() {
            return Err(PipelineError::SchemaConsistency(
                issues.iter().map(ToString::to_string).collect(),
            ));
        }
        run.advance(PipelineState::SemanticallyValidated);

        let remaining = run.ctx.remaining();
        if !self.config.has_headroom(remaining) {
            return Err(PipelineError::InsufficientTime {
                remaining_ms: remaining.map_or(0, |r| r.as_millis() as u64),
                required_ms: self.config.min_generation_headroom.as_millis() as u64,
            });
        }
        run.advance(PipelineState::TimeChecked);

        let languages = Language::dedup_supported(&request.target_languages);
        if languages.is_empty() {
            return Err(PipelineError::NoTargetLanguages);
        }

        let options = GenerateOptions {
            languages: languages.clone(),
            package_name: request.package.name.clone(),
            package_version: request.package.version.clone(),
            package_description: request.package.description.clone(),
            parallel: request.options.parallel,
            write_files: false,
        };
        let start = Instant::now();
        let outcome = self
            .orchestrator
            .generate(&request.schema, &options)
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))?;
        tracing::info!(
            languages = languages.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "orchestrator returned"
        );
        run.advance(PipelineState::Generated);

        let assembly = artifact::assemble(&languages, outcome);
        run.warnings.extend(assembly.warnings.iter().cloned());

        let output_hash = artifact::output_hash(&assembly.artifacts)?;
        let determinism_hash = determinism_hash(&input_hash, &output_hash);
        run.factory.set_output_hash(output_hash.clone());

        for summary in &assembly.summaries {
            run.emit(
                run.factory
                    .language_generation_decision(LanguageGenerationDecision {
                        language: summary.language.as_str().to_string(),
                        success: summary.success,
                        file_count: summary.file_count,
                        total_bytes: summary.total_bytes,
                        warning_count: summary.warning_count,
                        error_count: summary.error_count,
                    }),
            );
        }

        if assembly.all_failed() {
            return Err(PipelineError::AllLanguagesFailed(assembly.errors));
        }

        Ok(Generated {
            request,
            confidence,
            assembly,
            input_hash,
            output_hash,
            determinism_hash,
        })
    }

    fn respond(&self, run: &mut Run, generated: Generated) -> PipelineResponse {
        let Generated {
            request,
            confidence,
            assembly,
            input_hash,
            output_hash,
            determinism_hash,
        } = generated;
        run.advance(PipelineState::Responded);

        let partial = assembly.failed_languages() > 0;
        let (status, completion) = if partial {
            (207, CompletionStatus::Partial)
        } else {
            (200, CompletionStatus::Success)
        };

        run.emit(run.factory.completed(Completed {
            status: completion,
            languages: assembly
                .summaries
                .iter()
                .map(|s| s.language.as_str().to_string())
                .collect(),
            file_count: assembly.file_count(),
            total_bytes: assembly.total_bytes(),
            determinism_hash: determinism_hash.clone(),
            warning_count: run.warnings.len(),
            error_count: assembly.errors.len(),
        }));

        let headers = self.headers(&run.request_id, Some(&determinism_hash));
        let body = GenerationBody {
            success: !partial,
            request_id: run.request_id.clone(),
            artifacts: assembly.artifacts,
            compatibility: Compatibility {
                schema_version: request.schema.metadata.version,
                agent_version: self.config.agent_version.clone(),
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                determinism_hash,
                input_hash,
                output_hash,
            },
            confidence,
            warnings: std::mem::take(&mut run.warnings),
            errors: assembly.errors,
        };

        PipelineResponse {
            status,
            headers,
            body: ResponseBody::Generation(Box::new(body)),
        }
    }

    fn abort(&self, run: &mut Run, error: PipelineError) -> PipelineResponse {
        run.advance(PipelineState::Aborted);
        let mode = error.failure_mode();
        tracing::warn!(failure_mode = %mode, error = %error, "generation aborted");

        run.emit(run.factory.failed(mode, error.to_string(), error.details()));

        PipelineResponse {
            status: mode.status_code(),
            headers: self.headers(&run.request_id, None),
            body: ResponseBody::Error(ErrorBody {
                success: false,
                request_id: run.request_id.clone(),
                error: ErrorDetail::from(&error),
                warnings: std::mem::take(&mut run.warnings),
            }),
        }
    }

    fn headers(&self, request_id: &str, determinism: Option<&str>) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            (HEADER_AGENT_ID, self.config.agent_id.clone()),
            (HEADER_AGENT_VERSION, self.config.agent_version.clone()),
            (HEADER_REQUEST_ID, request_id.to_string()),
        ];
        if let Some(hash) = determinism {
            headers.push((HEADER_DETERMINISM_HASH, hash.to_string()));
        }
        headers
    }
}
