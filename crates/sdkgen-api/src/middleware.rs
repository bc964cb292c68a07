//! Router layers.
use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use sdkgen_core::{AGENT_ID, AGENT_VERSION};
use sdkgen_pipeline::{HEADER_AGENT_ID, HEADER_AGENT_VERSION};
use tower_http::cors::CorsLayer;

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Stamps agent identity on responses that do not carry it yet.
pub async fn agent_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    for (name, value) in [(HEADER_AGENT_ID, AGENT_ID), (HEADER_AGENT_VERSION, AGENT_VERSION)] {
        let name = HeaderName::from_static(name);
        if !headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
    response
}
