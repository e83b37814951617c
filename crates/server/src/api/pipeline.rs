//! Pipeline API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use meditone_core::{BatchReport, PipelineStatus};

use crate::state::AppState;

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct PipelineErrorResponse {
    pub error: String,
}

/// Get pipeline status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PipelineStatus>, (StatusCode, Json<PipelineErrorResponse>)> {
    state.orchestrator().status().await.map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(PipelineErrorResponse {
                error: e.to_string(),
            }),
        )
    })
}

/// Run one batch now and return its report
pub async fn run(State(state): State<Arc<AppState>>) -> Json<BatchReport> {
    Json(state.orchestrator().trigger().await)
}

/// Start the background scheduler
pub async fn start(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.orchestrator().start().await;
    Json(MessageResponse {
        message: "Pipeline scheduler started".to_string(),
    })
}

/// Stop the background scheduler
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.orchestrator().stop().await;
    Json(MessageResponse {
        message: "Pipeline scheduler stopped".to_string(),
    })
}
