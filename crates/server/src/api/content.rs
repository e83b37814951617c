//! Content API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use meditone_core::{ContentItem, ContentStatus, ScanError};

use super::jobs::JobResponse;
use crate::state::AppState;

/// Response for content lookups
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub id: String,
    pub status: ContentStatus,
    pub script: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambient_track: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_audio: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ContentItem> for ContentResponse {
    fn from(item: ContentItem) -> Self {
        Self {
            id: item.id,
            status: item.status,
            script: item.script,
            ambient_track: item.ambient_track.map(String::from),
            final_audio: item.final_audio.map(String::from),
            created_at: item.created_at.to_rfc3339(),
            updated_at: item.updated_at.to_rfc3339(),
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ContentErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> (StatusCode, Json<ContentErrorResponse>) {
    (status, Json(ContentErrorResponse { error }))
}

/// Get a content item by ID
pub async fn get_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ContentResponse>, impl IntoResponse> {
    match state.content_store().get(&id) {
        Ok(Some(item)) => Ok(Json(ContentResponse::from(item))),
        Ok(None) => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Content not found: {}", id),
        )),
        Err(e) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// Explicitly enqueue a job for a content item
pub async fn enqueue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<JobResponse>), impl IntoResponse> {
    match state.orchestrator().enqueue(&id) {
        Ok(job) => Ok((StatusCode::CREATED, Json(JobResponse::from(job)))),
        Err(e @ ScanError::ContentNotFound(_)) => {
            Err(error_response(StatusCode::NOT_FOUND, e.to_string()))
        }
        Err(e @ (ScanError::AlreadyQueued { .. } | ScanError::AlreadyReady(_))) => {
            Err(error_response(StatusCode::CONFLICT, e.to_string()))
        }
        Err(e) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}
