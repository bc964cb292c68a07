//! API Handlers
use crate::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use sdkgen_core::{InvocationContext, Language, PipelineError};
use sdkgen_pipeline::PipelineResponse;
use serde_json::{json, Value};

/// `POST /v1/generate`
///
/// The body is read up to the pipeline's ceiling. Anything larger is still
/// answered by the pipeline as a classified 413.
pub async fn generate(State(state): State<AppState>, headers: HeaderMap, body: Body) -> Response {
    let ctx = match state.execution_budget {
        Some(budget) => InvocationContext::with_budget(budget),
        None => InvocationContext::unbounded(),
    };
    let limit = state.pipeline.config().max_body_bytes;

    // Events keep flushing in the background after the response is returned.
    let handled = match Limited::new(body, limit).collect().await {
        Ok(collected) => state.pipeline.handle(&collected.to_bytes(), ctx).await,
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            let size = declared_length(&headers).unwrap_or_else(|| limit.saturating_add(1));
            state.pipeline.reject_oversized(size, ctx)
        }
        Err(e) => state.pipeline.reject(
            PipelineError::MalformedJson(format!("request body could not be read: {}", e)),
            ctx,
        ),
    };
    state.metrics.observe(handled.response.status, ctx.elapsed());
    into_http(handled.response)
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn into_http(response: PipelineResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match response.to_json() {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut http = (status, body).into_response();
    let headers = http.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in response.headers {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(name), value);
            }
            Err(_) => tracing::warn!(header = name, "dropping header with non-visible characters"),
        }
    }
    http
}

/// `GET /v1/health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let config = state.pipeline.config();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "agentId": config.agent_id,
            "agentVersion": config.agent_version,
            "eventSink": state.sink_name,
        })),
    )
}

/// `GET /v1/languages`
pub async fn languages() -> (StatusCode, Json<Value>) {
    let languages: Vec<Value> = Language::ALL
        .iter()
        .map(|l| {
            json!({
                "language": l.as_str(),
                "aliases": l.aliases(),
                "sumTypes": l.has_sum_types(),
            })
        })
        .collect();
    (StatusCode::OK, Json(json!({ "languages": languages })))
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
