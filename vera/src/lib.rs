//! HTTP front end for the VERA companion pipeline.

pub mod config;
pub mod loader;
pub mod logging;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use companion::{InferenceRequest, InferenceResult, Pipeline, SlotStatus};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

pub use crate::config::Config;
pub use crate::loader::load_slots;
pub use crate::logging::init_logging;

/// Largest accepted request body; screenshots arrive base64 encoded.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// State shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Error answered as JSON.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

/// Parse a request body leniently: an empty or unparsable body is `{}`.
fn parse_request(body: &[u8]) -> InferenceRequest {
    if body.iter().all(u8::is_ascii_whitespace) {
        return InferenceRequest::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(error = %e, "unparsable request body, using defaults");
        InferenceRequest::default()
    })
}

pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<InferenceResult>, ApiError> {
    let request = parse_request(&body);
    match state.pipeline.run(request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            error!(error = %format!("{e:#}"), "prediction failed");
            Err(ApiError::internal(format!("{e:#}")))
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<SlotStatus> {
    Json(state.pipeline.status())
}

/// Build the application router with the provided state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_body_parsing() {
        assert_eq!(parse_request(b""), InferenceRequest::default());
        assert_eq!(parse_request(b"  \n"), InferenceRequest::default());
        assert_eq!(parse_request(b"not json"), InferenceRequest::default());
        assert_eq!(parse_request(b"null"), InferenceRequest::default());
        let req = parse_request(br#"{"userText": "hey"}"#);
        assert_eq!(req.user_text.as_deref(), Some("hey"));
    }

    #[test]
    fn mistyped_fields_do_not_discard_the_rest() {
        let req = parse_request(
            br#"{"userText": "where am I?", "image": "abcd", "sceneState": {"level": 1}}"#,
        );
        assert_eq!(req.user_text.as_deref(), Some("where am I?"));
        assert_eq!(req.image.as_deref(), Some("abcd"));
        assert_eq!(req.scene_state, None);

        let req = parse_request(br#"{"userText": 5, "image": "abcd", "sceneState": null}"#);
        assert_eq!(req.user_text, None);
        assert_eq!(req.image.as_deref(), Some("abcd"));
    }
}
