//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock services injected, so the full pipeline can be driven over
//! HTTP without a TTS service or ffmpeg.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use meditone_core::{
    testing::{MockGenerator, MockMixer},
    Config, ContentStore, DatabaseConfig, JobStore, PipelineConfig, PipelineOrchestrator,
    SqliteContentStore, SqliteJobStore,
};

/// Re-export fixtures for test convenience
pub use meditone_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_enqueue() {
///     let fixture = TestFixture::new().await;
///     fixture.add_content("c1");
///
///     let response = fixture.post_empty("/api/v1/content/c1/jobs").await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock TTS service - inject failures, inspect scripts
    pub generator: MockGenerator,
    /// Mock mixer - inject failures, inspect requests
    pub mixer: MockMixer,
    pub job_store: Arc<SqliteJobStore>,
    pub content_store: Arc<SqliteContentStore>,
    pub orchestrator: Arc<PipelineOrchestrator>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default pipeline settings.
    pub async fn new() -> Self {
        Self::with_pipeline(PipelineConfig::default()).await
    }

    /// Create a test fixture with a custom pipeline configuration.
    pub async fn with_pipeline(pipeline: PipelineConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            pipeline,
            ..Default::default()
        };

        let job_store =
            Arc::new(SqliteJobStore::new(&db_path).expect("Failed to create job store"));
        let content_store =
            Arc::new(SqliteContentStore::new(&db_path).expect("Failed to create content store"));

        let generator = MockGenerator::new();
        let mixer = MockMixer::new();

        let orchestrator = Arc::new(PipelineOrchestrator::new(
            config.pipeline.clone(),
            config.mix.clone(),
            Arc::clone(&job_store) as Arc<dyn JobStore>,
            Arc::clone(&content_store) as Arc<dyn ContentStore>,
            Arc::new(generator.clone()),
            Arc::new(mixer.clone()),
        ));

        let state = Arc::new(meditone_server::state::AppState::new(
            config,
            Arc::clone(&job_store) as Arc<dyn JobStore>,
            Arc::clone(&content_store) as Arc<dyn ContentStore>,
            Arc::clone(&orchestrator),
        ));

        let router = meditone_server::api::create_router(state);

        Self {
            router,
            generator,
            mixer,
            job_store,
            content_store,
            orchestrator,
            temp_dir,
        }
    }

    /// Insert a pending content item.
    pub fn add_content(&self, id: &str) {
        fixtures::pending_content(self.content_store.as_ref(), id);
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
