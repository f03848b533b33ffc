//! Mock generation service client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::enrichment::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// Mock implementation of the LlmClient trait.
///
/// Provides controllable behavior for testing:
/// - Queue one-shot responses or errors (consumed in order)
/// - Fall back to a default response once the queue is empty
/// - Route by prompt content, so concurrent callers get deterministic answers
/// - Simulate latency
/// - Record every prompt for assertions
///
/// # Example
///
/// ```rust,ignore
/// use supportai_core::testing::MockLlmClient;
///
/// let llm = MockLlmClient::with_response(r#"{"title":"t","body":"b","priority":"Low","action":"a"}"#);
/// llm.respond_when_contains("broken", "not json").await;
/// ```
#[derive(Debug, Default)]
pub struct MockLlmClient {
    queued: Arc<RwLock<VecDeque<Result<String, LlmError>>>>,
    routes: Arc<RwLock<Vec<(String, String)>>>,
    default_response: Arc<RwLock<Option<String>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockLlmClient {
    /// Create a mock with no responses configured.
    ///
    /// Calls fail with a 503 API error until something is configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that always answers with `text`.
    pub fn with_response(text: impl Into<String>) -> Self {
        Self {
            default_response: Arc::new(RwLock::new(Some(text.into()))),
            ..Self::default()
        }
    }

    /// Queue a one-shot successful response.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.queued.write().await.push_back(Ok(text.into()));
    }

    /// Queue a one-shot error.
    pub async fn push_error(&self, error: LlmError) {
        self.queued.write().await.push_back(Err(error));
    }

    /// Answer with `text` whenever the prompt contains `needle`.
    ///
    /// Routes are checked before the queue.
    pub async fn respond_when_contains(&self, needle: impl Into<String>, text: impl Into<String>) {
        self.routes.write().await.push((needle.into(), text.into()));
    }

    /// Replace the default response.
    pub async fn set_default_response(&self, text: impl Into<String>) {
        *self.default_response.write().await = Some(text.into());
    }

    /// Delay every response by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// All prompts received so far.
    pub async fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.read().await.clone()
    }

    /// Number of completion calls made.
    pub async fn call_count(&self) -> usize {
        self.prompts.read().await.len()
    }

    async fn next_result(&self, prompt: &str) -> Result<String, LlmError> {
        if let Some((_, text)) = self
            .routes
            .read()
            .await
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
        {
            return Ok(text.clone());
        }

        if let Some(result) = self.queued.write().await.pop_front() {
            return result;
        }

        self.default_response
            .read()
            .await
            .clone()
            .ok_or_else(|| LlmError::Api {
                status: 503,
                message: "mock has no response configured".to_string(),
            })
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.write().await.push(request.prompt.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let text = self.next_result(&request.prompt).await?;
        Ok(CompletionResponse {
            text,
            usage: LlmUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            model: "mock-model".to_string(),
        })
    }
}
