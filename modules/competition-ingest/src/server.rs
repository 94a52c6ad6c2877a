use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::warn;

use crate::ingestor::Ingestor;

/// Trigger payload when the caller wraps the URL: `{ "body": "<url>" }`.
#[derive(Deserialize)]
struct TriggerEnvelope {
    body: String,
}

pub fn router(ingestor: Arc<Ingestor>) -> Router {
    Router::new()
        .route("/", post(ingest))
        .route("/health", get(health))
        .with_state(ingestor)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

/// The request body is the source URL, either raw or wrapped in a
/// `{"body": ...}` envelope.
pub fn source_url_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    let url = if trimmed.starts_with('{') {
        serde_json::from_str::<TriggerEnvelope>(trimmed).ok()?.body
    } else {
        trimmed.to_string()
    };
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}

async fn ingest(State(ingestor): State<Arc<Ingestor>>, body: Bytes) -> Response {
    let Ok(body) = std::str::from_utf8(&body) else {
        return unprocessable("request body is not valid UTF-8");
    };
    let Some(source_url) = source_url_from_body(body) else {
        return unprocessable("missing source URL");
    };

    match ingestor.ingest(&source_url).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "canonical_id": outcome.canonical_id,
                "region_id": outcome.region.id(),
            })),
        )
            .into_response(),
        Err(e) => {
            warn!(source_url = source_url.as_str(), kind = e.kind(), error = %e, "Ingestion failed");
            unprocessable(&e.to_string())
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

fn unprocessable(message: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
