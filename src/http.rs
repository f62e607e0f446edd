use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::{
    orchestrator::CoachOrchestrator,
    types::{CoachResponse, MessageCategory},
};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<CoachOrchestrator>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/coach/{category}", post(coach_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<CoachResponse> {
    Json(state.orchestrator.chat(&request.message).await)
}

async fn coach_message(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<CoachResponse>, (axum::http::StatusCode, String)> {
    let Some(category) = MessageCategory::parse(&category) else {
        return Err((
            axum::http::StatusCode::BAD_REQUEST,
            format!("unknown message category: {category}"),
        ));
    };

    Ok(Json(state.orchestrator.generate(category).await))
}
