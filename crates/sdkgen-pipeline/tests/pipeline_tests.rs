//! End-to-end tests for the pipeline handler against the shared request fixtures.

use async_trait::async_trait;
use sdkgen_core::{
    CanonicalSchema, FailureMode, GenerateOptions, GeneratedFile, GenerationOrchestrator,
    GenerationOutcome, InvocationContext, Language, LanguageResult, OrchestratorError,
};
use sdkgen_events::{EventKind, HttpCollectorSink, MemorySink, TransportConfig};
use sdkgen_pipeline::{PipelineConfig, PipelineHandler, PipelineResponse};
use sdkgen_templates::TemplateOrchestrator;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn fixture(name: &str) -> Vec<u8> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    std::fs::read(workspace_root.join("testing/fixtures/requests").join(name)).unwrap()
}

/// Orchestrator returning a scripted outcome and counting calls.
struct ScriptedOrchestrator {
    calls: AtomicUsize,
    failing: Vec<Language>,
    error: Option<OrchestratorError>,
}

impl ScriptedOrchestrator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failing: Vec::new(),
            error: None,
        }
    }

    fn failing(languages: &[Language]) -> Self {
        Self {
            failing: languages.to_vec(),
            ..Self::new()
        }
    }

    fn erroring(error: OrchestratorError) -> Self {
        Self {
            error: Some(error),
            ..Self::new()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationOrchestrator for ScriptedOrchestrator {
    async fn generate(
        &self,
        _schema: &CanonicalSchema,
        options: &GenerateOptions,
    ) -> Result<GenerationOutcome, OrchestratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        let mut outcome = GenerationOutcome::default();
        for &language in &options.languages {
            let result = if self.failing.contains(&language) {
                LanguageResult::failed("template exploded")
            } else {
                LanguageResult {
                    files: vec![GeneratedFile::new(
                        "README.md",
                        format!("# {} for {}\n", options.package_name, language),
                    )],
                    build_command: Some("make".into()),
                    ..LanguageResult::default()
                }
            };
            outcome.results.insert(language, result);
        }
        Ok(outcome)
    }
}

fn handler(orchestrator: Arc<dyn GenerationOrchestrator>, sink: Arc<MemorySink>) -> PipelineHandler {
    PipelineHandler::new(orchestrator, sink)
}

fn templates() -> Arc<dyn GenerationOrchestrator> {
    Arc::new(TemplateOrchestrator::new().unwrap())
}

async fn run(handler: &PipelineHandler, body: &[u8], ctx: InvocationContext) -> PipelineResponse {
    let handled = handler.handle(body, ctx).await;
    handled.events.drain().await;
    handled.response
}

// =============================================================================
// Determinism
// =============================================================================

#[tokio::test]
async fn test_identical_input_reproduces_determinism_hash() {
    let handler = handler(templates(), Arc::new(MemorySink::new()));
    let body = fixture("petstore.json");

    let first = run(&handler, &body, InvocationContext::unbounded()).await;
    let second = run(&handler, &body, InvocationContext::unbounded()).await;

    assert_eq!(first.status, 200);
    let a = first.generation().unwrap();
    let b = second.generation().unwrap();
    assert_ne!(a.request_id, b.request_id);
    assert_eq!(a.compatibility.input_hash, b.compatibility.input_hash);
    assert_eq!(a.compatibility.output_hash, b.compatibility.output_hash);
    assert_eq!(a.compatibility.determinism_hash, b.compatibility.determinism_hash);
    assert_eq!(a.artifacts.len(), 5);
    for (x, y) in a.artifacts.iter().zip(&b.artifacts) {
        assert_eq!(x.files, y.files);
    }
    assert_eq!(
        first.header("x-determinism-hash"),
        Some(a.compatibility.determinism_hash.as_str())
    );
}

#[tokio::test]
async fn test_formatting_does_not_change_input_hash() {
    let handler = handler(templates(), Arc::new(MemorySink::new()));
    let body = fixture("missing-response-type.json");
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let compact = serde_json::to_vec(&value).unwrap();

    let a = run(&handler, &body, InvocationContext::unbounded()).await;
    let b = run(&handler, &compact, InvocationContext::unbounded()).await;
    assert_eq!(
        a.generation().unwrap().compatibility.input_hash,
        b.generation().unwrap().compatibility.input_hash
    );
}

#[tokio::test]
async fn test_artifacts_follow_requested_order() {
    let handler = handler(templates(), Arc::new(MemorySink::new()));
    let response = run(&handler, &fixture("petstore.json"), InvocationContext::unbounded()).await;

    let languages: Vec<Language> = response
        .generation()
        .unwrap()
        .artifacts
        .iter()
        .map(|a| a.language)
        .collect();
    assert_eq!(
        languages,
        vec![Language::Typescript, Language::Python, Language::Go, Language::Java, Language::Rust]
    );
}

// =============================================================================
// Referential asymmetry
// =============================================================================

#[tokio::test]
async fn test_missing_response_type_generates_with_one_warning() {
    let sink = Arc::new(MemorySink::new());
    let handler = handler(templates(), sink.clone());
    let response = run(&handler, &fixture("missing-response-type.json"), InvocationContext::unbounded()).await;

    assert_eq!(response.status, 200);
    assert!(response.is_success());
    let body = response.generation().unwrap();
    assert!(body.errors.is_empty());
    assert_eq!(body.warnings.len(), 1, "{:?}", body.warnings);
    assert!(body.warnings[0].contains("T3"));
    assert_eq!(body.confidence.breakdown.type_mapping, 1.0);
    assert_eq!(body.compatibility.schema_version.as_deref(), Some("1.0.0"));
}

#[tokio::test]
async fn test_missing_request_type_blocks_generation() {
    let sink = Arc::new(MemorySink::new());
    let orchestrator = Arc::new(ScriptedOrchestrator::new());
    let handler = handler(orchestrator.clone(), sink.clone());
    let response = run(&handler, &fixture("missing-request-type.json"), InvocationContext::unbounded()).await;

    assert_eq!(response.status, 400);
    let error = response.error().unwrap();
    assert_eq!(error.code, FailureMode::InvalidSchema);
    assert!(!error.recoverable);
    assert_eq!(error.errors.len(), 1);
    assert!(error.errors[0].contains("createName"));
    assert!(error.errors[0].contains("T3"));
    assert_eq!(orchestrator.calls(), 0);

    let failed = sink.kinds().iter().filter(|k| **k == "failed").count();
    assert_eq!(failed, 1);
    assert!(response.header("x-determinism-hash").is_none());
}

// =============================================================================
// Aborts
// =============================================================================

#[tokio::test]
async fn test_structural_failure_never_reaches_semantics() {
    let sink = Arc::new(MemorySink::new());
    let orchestrator = Arc::new(ScriptedOrchestrator::new());
    let handler = handler(orchestrator.clone(), sink.clone());
    let response = run(&handler, &fixture("structurally-invalid.json"), InvocationContext::unbounded()).await;

    assert_eq!(response.status, 400);
    assert_eq!(response.failure_mode(), Some(FailureMode::InvalidSchema));
    assert!(!response.error().unwrap().errors.is_empty());
    assert_eq!(sink.kinds(), vec!["failed", "telemetry"]);
    assert_eq!(orchestrator.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json() {
    let sink = Arc::new(MemorySink::new());
    let handler = handler(templates(), sink.clone());
    let response = run(&handler, b"{\"targetLanguages\": [", InvocationContext::unbounded()).await;

    assert_eq!(response.status, 400);
    assert_eq!(response.failure_mode(), Some(FailureMode::InvalidSchema));
    let events = sink.events();
    assert!(events[0].input_hash().starts_with("blake3:"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected_before_parsing() {
    let sink = Arc::new(MemorySink::new());
    let handler = handler(templates(), sink.clone()).with_config(PipelineConfig {
        max_body_bytes: 64,
        ..PipelineConfig::default()
    });
    let response = run(&handler, &fixture("petstore.json"), InvocationContext::unbounded()).await;

    assert_eq!(response.status, 413);
    let error = response.error().unwrap();
    assert_eq!(error.code, FailureMode::ResourceExhaustion);
    assert!(error.message.contains("64"));
    assert_eq!(sink.kinds(), vec!["failed", "telemetry"]);
}

#[tokio::test]
async fn test_inconsistent_schema_is_a_schema_validation_failure() {
    let sink = Arc::new(MemorySink::new());
    let orchestrator = Arc::new(ScriptedOrchestrator::new());
    let handler = handler(orchestrator.clone(), sink.clone());
    let response = run(&handler, &fixture("schema-inconsistent.json"), InvocationContext::unbounded()).await;

    assert_eq!(response.status, 400);
    let error = response.error().unwrap();
    assert_eq!(error.code, FailureMode::SchemaValidationFailure);
    assert!(!error.recoverable);
    assert_eq!(
        error.errors,
        vec!["types[1].properties[0].typeRef: unknown type 'Ghost'".to_string()]
    );
    assert_eq!(orchestrator.calls(), 0);
    assert!(response.header("x-request-id").is_some());
    assert!(response.header("x-determinism-hash").is_none());

    assert_eq!(
        sink.kinds(),
        vec![
            "initiated",
            "type_mapping_decision",
            "type_mapping_decision",
            "failed",
            "telemetry",
        ]
    );
    match sink.events()[3].kind() {
        EventKind::Failed(failed) => {
            assert_eq!(failed.failure_mode, FailureMode::SchemaValidationFailure);
            assert_eq!(failed.errors, error.errors);
        }
        other => panic!("expected failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unread_oversized_body_is_still_classified() {
    let sink = Arc::new(MemorySink::new());
    let orchestrator = Arc::new(ScriptedOrchestrator::new());
    let handler = handler(orchestrator.clone(), sink.clone());

    let handled = handler.reject_oversized(12_000_000, InvocationContext::unbounded());
    handled.events.drain().await;
    let response = handled.response;

    assert_eq!(response.status, 413);
    let error = response.error().unwrap();
    assert_eq!(error.code, FailureMode::ResourceExhaustion);
    assert!(error.message.contains("12000000"));
    assert!(!error.action.is_empty());
    assert!(response.header("x-request-id").is_some());
    assert_eq!(response.header("x-agent-id"), Some("sdk-generator"));
    assert_eq!(sink.kinds(), vec!["failed", "telemetry"]);
    assert_eq!(orchestrator.calls(), 0);
}

#[tokio::test]
async fn test_insufficient_budget_times_out_without_generating() {
    let orchestrator = Arc::new(ScriptedOrchestrator::new());
    let handler = handler(orchestrator.clone(), Arc::new(MemorySink::new()));
    let ctx = InvocationContext::with_budget(Duration::from_secs(10));
    let response = run(&handler, &fixture("missing-response-type.json"), ctx).await;

    assert_eq!(response.status, 408);
    let error = response.error().unwrap();
    assert_eq!(error.code, FailureMode::Timeout);
    assert!(error.recoverable);
    assert_eq!(orchestrator.calls(), 0);
}

#[tokio::test]
async fn test_generous_budget_generates() {
    let handler = handler(templates(), Arc::new(MemorySink::new()));
    let ctx = InvocationContext::with_budget(Duration::from_secs(300));
    let response = run(&handler, &fixture("missing-response-type.json"), ctx).await;
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_orchestrator_error_is_classified() {
    let orchestrator = Arc::new(ScriptedOrchestrator::erroring(OrchestratorError::Internal(
        "worker pool gone".into(),
    )));
    let handler = handler(orchestrator.clone(), Arc::new(MemorySink::new()));
    let response = run(&handler, &fixture("missing-response-type.json"), InvocationContext::unbounded()).await;

    assert_eq!(response.status, 500);
    let error = response.error().unwrap();
    assert_eq!(error.code, FailureMode::TemplateRenderingFailure);
    assert!(error.message.contains("worker pool gone"));
    assert_eq!(orchestrator.calls(), 1);
}

// =============================================================================
// Partial success
// =============================================================================

#[tokio::test]
async fn test_one_failing_language_is_partial_success() {
    let sink = Arc::new(MemorySink::new());
    let orchestrator = Arc::new(ScriptedOrchestrator::failing(&[Language::Python]));
    let handler = handler(orchestrator, sink.clone());
    let response = run(&handler, &fixture("missing-response-type.json"), InvocationContext::unbounded()).await;

    assert_eq!(response.status, 207);
    assert!(!response.is_success());
    let body = response.generation().unwrap();
    assert!(!body.success);
    assert_eq!(body.artifacts.len(), 1);
    assert_eq!(body.artifacts[0].language, Language::Typescript);
    assert_eq!(body.artifacts[0].files.len(), 1);
    assert_eq!(body.errors, vec!["[python] template exploded".to_string()]);
    assert!(response.header("x-determinism-hash").is_some());

    let completed = sink
        .events()
        .into_iter()
        .find_map(|e| match e.kind() {
            EventKind::Completed(c) => Some(c.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(completed.error_count, 1);
}

#[tokio::test]
async fn test_every_language_failing_is_an_error() {
    let sink = Arc::new(MemorySink::new());
    let orchestrator = Arc::new(ScriptedOrchestrator::failing(&[Language::Typescript, Language::Python]));
    let handler = handler(orchestrator, sink.clone());
    let response = run(&handler, &fixture("missing-response-type.json"), InvocationContext::unbounded()).await;

    assert_eq!(response.status, 500);
    let error = response.error().unwrap();
    assert_eq!(error.code, FailureMode::TemplateRenderingFailure);
    assert_eq!(error.errors.len(), 2);

    let kinds = sink.kinds();
    assert_eq!(kinds.iter().filter(|k| **k == "failed").count(), 1);
    assert!(!kinds.contains(&"completed"));
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn test_event_order_on_success() {
    let sink = Arc::new(MemorySink::new());
    let handler = handler(templates(), sink.clone());
    let response = run(&handler, &fixture("missing-response-type.json"), InvocationContext::unbounded()).await;

    assert_eq!(
        sink.kinds(),
        vec![
            "initiated",
            "type_mapping_decision",
            "type_mapping_decision",
            "language_generation_decision",
            "language_generation_decision",
            "completed",
            "telemetry",
        ]
    );

    let body = response.generation().unwrap();
    let events = sink.events();
    for event in &events {
        assert_eq!(event.request_id(), body.request_id);
        assert_eq!(event.input_hash(), body.compatibility.input_hash);
    }
    let completed = events.iter().find(|e| e.kind_name() == "completed").unwrap();
    assert_eq!(completed.output_hash(), Some(body.compatibility.output_hash.as_str()));
}

#[tokio::test]
async fn test_semantic_failure_emits_initiated_then_failed() {
    let sink = Arc::new(MemorySink::new());
    let handler = handler(templates(), sink.clone());
    run(&handler, &fixture("missing-request-type.json"), InvocationContext::unbounded()).await;

    let kinds = sink.kinds();
    assert_eq!(kinds.first(), Some(&"initiated"));
    assert_eq!(&kinds[kinds.len() - 2..], &["failed", "telemetry"]);
    match sink.events().last().unwrap().kind() {
        EventKind::Telemetry(t) => {
            assert_eq!(t.status_code, 400);
            assert_eq!(t.failure_mode, Some(FailureMode::InvalidSchema));
        }
        other => panic!("expected telemetry, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_collector_does_not_change_outcome() {
    let sink = Arc::new(HttpCollectorSink::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap());
    let handler = PipelineHandler::new(templates(), sink).with_config(PipelineConfig {
        transport: TransportConfig {
            send_timeout: Duration::from_millis(500),
            ..TransportConfig::default()
        },
        ..PipelineConfig::default()
    });

    let start = Instant::now();
    let handled = handler
        .handle(&fixture("missing-response-type.json"), InvocationContext::unbounded())
        .await;
    assert_eq!(handled.response.status, 200);
    assert!(handled.response.is_success());

    handled.events.drain().await;
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(handled.events.pending_events(), 0);
}

#[tokio::test]
async fn test_metadata_headers_on_every_response() {
    let handler = handler(templates(), Arc::new(MemorySink::new()));
    for body in [fixture("petstore.json"), b"nope".to_vec()] {
        let response = run(&handler, &body, InvocationContext::unbounded()).await;
        assert_eq!(response.header("x-agent-id"), Some("sdk-generator"));
        assert!(response.header("x-agent-version").is_some());
        assert!(response.header("x-request-id").is_some());
    }
}
