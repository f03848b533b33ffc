//! Generation service client abstraction and the Ollama implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::metrics::{LLM_REQUESTS, LLM_TOKENS};

/// Error type for generation service calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response envelope: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

impl LlmError {
    /// Label used for the request metric.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Http(_) => "http_error",
            LlmError::Api { .. } => "api_error",
            LlmError::InvalidResponse(_) => "invalid_response",
            LlmError::Timeout(_) => "timeout",
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Request for a single non-streaming completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated text, untouched
    pub text: String,
    pub usage: LlmUsage,
    /// Model that served the request
    pub model: String,
}

/// One prompt in, one complete text blob out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g., "ollama")
    fn provider(&self) -> &str;

    /// Model name sent with every request
    fn model(&self) -> &str;

    /// Send a completion request and wait for the whole response.
    ///
    /// Any non-success status is an error; the body is never handed back as
    /// generated text.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

// ============================================================================
// Ollama Implementation
// ============================================================================

/// Ollama API client for local LLM inference.
///
/// Connects to a local Ollama server (default: http://localhost:11434).
/// No API key required.
pub struct OllamaClient {
    client: reqwest::Client,
    model: String,
    api_base: String,
    timeout: Option<Duration>,
}

impl OllamaClient {
    /// Create a new Ollama client with the specified model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: model.into(),
            api_base: "http://localhost:11434".to_string(),
            timeout: None,
        }
    }

    /// Set a custom API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every HTTP request at the transport level.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.api_base)
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    model: Option<String>,
    response: String,
    /// Number of tokens in the response
    #[serde(default)]
    eval_count: u32,
    /// Number of tokens in the prompt
    #[serde(default)]
    prompt_eval_count: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn provider(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let result = self.send(&request).await;
        let label = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        LLM_REQUESTS.with_label_values(&[label]).inc();

        if let Ok(response) = &result {
            LLM_TOKENS
                .with_label_values(&["input"])
                .inc_by(u64::from(response.usage.input_tokens));
            LLM_TOKENS
                .with_label_values(&["output"])
                .inc_by(u64::from(response.usage.output_tokens));
        }

        result
    }
}

impl OllamaClient {
    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = OllamaRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
        };

        let mut builder = self
            .client
            .post(self.generate_url())
            .header("content-type", "application/json")
            .json(&body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.timeout.unwrap_or_default())
            } else {
                LlmError::Http(e.to_string())
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let ollama_response: OllamaResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.timeout.unwrap_or_default())
            } else {
                LlmError::InvalidResponse(e.to_string())
            }
        })?;

        Ok(CompletionResponse {
            text: ollama_response.response,
            usage: LlmUsage {
                input_tokens: ollama_response.prompt_eval_count,
                output_tokens: ollama_response.eval_count,
            },
            model: ollama_response.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}
