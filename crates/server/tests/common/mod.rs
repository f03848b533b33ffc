//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with an in-memory bus and, optionally, a running enrichment pipeline
//! backed by a scripted generation service.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use supportai_core::{
    testing::{MockBus, MockLlmClient},
    Config, Enricher, EnrichmentPipeline, MessageBus,
};
use supportai_server::state::AppState;

/// Re-export fixtures for test convenience
pub use supportai_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_send() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/send", json!({ "message": "hi" })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// In-memory bus shared by ingress and pipeline
    pub bus: Arc<MockBus>,
    /// Scripted generation service
    pub llm: Arc<MockLlmClient>,
    /// Running pipeline (if enabled)
    pub pipeline: Option<Arc<EnrichmentPipeline>>,
    /// Config the router was built with
    pub config: Config,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Start the enrichment pipeline alongside the router
    pub enable_pipeline: bool,
    /// Override the default config
    pub config: Option<Config>,
}

impl TestConfig {
    pub fn with_pipeline() -> Self {
        Self {
            enable_pipeline: true,
            config: None,
        }
    }
}

impl TestFixture {
    /// Create a new test fixture without a pipeline.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let config = test_config.config.unwrap_or_default();
        let bus = Arc::new(MockBus::new());
        let llm = Arc::new(MockLlmClient::new());

        let pipeline = if test_config.enable_pipeline {
            let enricher = Arc::new(Enricher::new(
                Arc::clone(&llm) as Arc<dyn supportai_core::LlmClient>,
                Duration::from_secs(2),
            ));
            let pipeline = Arc::new(EnrichmentPipeline::new(
                &config.pipeline,
                &config.bus,
                Arc::clone(&bus) as Arc<dyn MessageBus>,
                enricher,
            ));
            pipeline.start().await.expect("Failed to start pipeline");
            Some(pipeline)
        } else {
            None
        };

        let state = Arc::new(AppState::new(
            config.clone(),
            Arc::clone(&bus) as Arc<dyn MessageBus>,
            pipeline.clone(),
        ));
        let router = supportai_server::api::create_router(state);

        Self {
            router,
            bus,
            llm,
            pipeline,
            config,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.post_raw(path, &serde_json::to_string(&body).unwrap())
            .await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.post_with_content_type(path, body, "application/json")
            .await
    }

    /// Send a POST request with custom content type (for testing wrong content types).
    pub async fn post_with_content_type(
        &self,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
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

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }

    /// Raw subject the ingress publishes to.
    pub fn raw_subject(&self) -> &str {
        &self.config.bus.raw_subject
    }

    /// Subject the pipeline publishes tickets to.
    pub fn enriched_subject(&self) -> &str {
        &self.config.bus.enriched_subject
    }
}
