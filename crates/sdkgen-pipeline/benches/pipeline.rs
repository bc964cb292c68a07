use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sdkgen_core::{hash_canonical, GenerationRequest, InvocationContext};
use sdkgen_events::MemorySink;
use sdkgen_pipeline::PipelineHandler;
use sdkgen_templates::TemplateOrchestrator;
use std::sync::Arc;

fn petstore() -> Vec<u8> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    std::fs::read(workspace_root.join("testing/fixtures/requests/petstore.json")).unwrap()
}

fn bench_input_hash(c: &mut Criterion) {
    let request: GenerationRequest = serde_json::from_slice(&petstore()).unwrap();
    c.bench_function("input_hash_petstore", |b| {
        b.iter(|| hash_canonical(black_box(&request)).unwrap())
    });
}

fn bench_confidence(c: &mut Criterion) {
    let request: GenerationRequest = serde_json::from_slice(&petstore()).unwrap();
    c.bench_function("confidence_petstore", |b| {
        b.iter(|| sdkgen_confidence::score(black_box(&request.schema), &request.target_languages))
    });
}

fn bench_handle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let body = petstore();
    let handler = PipelineHandler::new(
        Arc::new(TemplateOrchestrator::new().unwrap()),
        Arc::new(MemorySink::new()),
    );
    c.bench_function("handle_petstore_all_languages", |b| {
        b.iter(|| {
            rt.block_on(async {
                let handled = handler.handle(black_box(&body), InvocationContext::unbounded()).await;
                handled.events.drain().await;
                handled.response.status
            })
        })
    });
}

criterion_group!(benches, bench_input_hash, bench_confidence, bench_handle);
criterion_main!(benches);
