use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::ExtractionError;
use crate::extract::Pipeline;
use crate::models::{EnhanceRequest, ExtractRequest};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract_endpoint))
        .route("/enhance", post(enhance_endpoint))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn extract_endpoint(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Response {
    let record = state.pipeline.extract(&req.url, req.mode).await;
    (status_for(record.error.as_ref()), Json(record)).into_response()
}

async fn enhance_endpoint(
    State(state): State<AppState>,
    Json(req): Json<EnhanceRequest>,
) -> Response {
    let result = state
        .pipeline
        .enhance(&req.description, req.job_title.as_deref(), req.company.as_deref())
        .await;
    (status_for(result.error.as_ref()), Json(result)).into_response()
}

fn status_for(error: Option<&ExtractionError>) -> StatusCode {
    match error {
        None => StatusCode::OK,
        Some(ExtractionError::InvalidUrl | ExtractionError::EmptyDescription) => {
            StatusCode::BAD_REQUEST
        }
        Some(ExtractionError::MissingCredential) => StatusCode::SERVICE_UNAVAILABLE,
        Some(
            ExtractionError::Fetch(_)
            | ExtractionError::MalformedResponse(_)
            | ExtractionError::Completion(_),
        ) => StatusCode::BAD_GATEWAY,
        Some(ExtractionError::EmptyOrBlockedContent | ExtractionError::MinimalFieldsMissing) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(None), StatusCode::OK);
        assert_eq!(status_for(Some(&ExtractionError::InvalidUrl)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(Some(&ExtractionError::MissingCredential)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(Some(&ExtractionError::Fetch(FetchError::HttpStatus(403)))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(Some(&ExtractionError::MinimalFieldsMissing)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
