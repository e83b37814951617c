use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{content, handlers, jobs, middleware::metrics_middleware, pipeline};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Pipeline
        .route("/pipeline/status", get(pipeline::get_status))
        .route("/pipeline/run", post(pipeline::run))
        .route("/pipeline/start", post(pipeline::start))
        .route("/pipeline/stop", post(pipeline::stop))
        // Jobs
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/{id}", get(jobs::get_job))
        // Content
        .route("/content/{id}", get(content::get_content))
        .route("/content/{id}/jobs", post(content::enqueue))
        .with_state(Arc::clone(&state));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
