use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::TravelAiError;
use crate::orchestrator::{TravelOrchestrator, TravelResponse};
use crate::router::Intent;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<TravelOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<TravelOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TravelRequest {
    pub prompt: String,
    #[serde(default)]
    pub intent: Option<String>,
}

/// Error body: `{"error": <user message>, "detail": <cause>}`
pub struct ApiError(TravelAiError);

impl From<TravelAiError> for ApiError {
    fn from(err: TravelAiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TravelAiError::Validation { .. } => StatusCode::BAD_REQUEST,
            TravelAiError::Tool { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Rejected request: {}", self.0);
        }
        let body = json!({
            "error": self.0.user_message(),
            "detail": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/travel", post(travel))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "TripSense travel assistant is running.",
        "version": crate::VERSION,
        "docs": "/",
        "travel_endpoint": "/travel",
    }))
}

async fn travel(
    State(state): State<AppState>,
    Json(request): Json<TravelRequest>,
) -> Result<Json<TravelResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(TravelAiError::validation("prompt must not be empty").into());
    }

    let forced_intent = request
        .intent
        .as_deref()
        .filter(|intent| !intent.trim().is_empty())
        .map(str::parse::<Intent>)
        .transpose()?;

    let response = state.orchestrator.run(&request.prompt, forced_intent).await?;
    Ok(Json(response))
}
