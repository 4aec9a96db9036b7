//! Model Invoker
//!
//! Submits an assembled prompt to a hosted chat-completion endpoint with
//! exponential-backoff-with-jitter retries on throttling. The invoker never
//! raises past its own boundary: every failure mode maps to a fixed
//! user-facing string.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

/// Returned when the endpoint repeatedly answers with a malformed envelope
pub const INVALID_RESPONSE_MESSAGE: &str =
    "Error: Received an invalid response from the AI service. Please try again.";
/// Returned when the endpoint keeps failing with a classified API error
pub const SERVICE_ERROR_MESSAGE: &str =
    "I encountered an error accessing the AI service. Please try again later.";
/// Returned when transport-level failures persist through the final attempt
pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "I encountered an unexpected error. Please try again later.";
/// Returned when the attempt loop runs out without any terminal branch firing
pub const RETRIES_EXHAUSTED_MESSAGE: &str =
    "I couldn't process this request after multiple attempts. Please try again later.";

/// A single chat message
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request envelope for the chat-completion endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

/// One generated segment in the response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default)]
    pub block_type: String,
    #[serde(default)]
    pub text: String,
}

/// Response envelope from the chat-completion endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// Errors from the chat-completion endpoint
#[derive(Debug, Error)]
pub enum ModelApiError {
    /// The endpoint asked the caller to back off
    #[error("model endpoint throttled: {0}")]
    Throttled(String),
    /// Any other classified API error
    #[error("model endpoint error: {status} {message}")]
    Api { status: u16, message: String },
    /// Transport-level failure (connect, timeout, body read)
    #[error("model transport error: {0}")]
    Transport(String),
}

/// A hosted chat-completion endpoint
#[async_trait]
pub trait ChatCompletionApi: Send + Sync {
    async fn send(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ModelApiError>;
}

/// Anthropic-style messages endpoint client
pub struct AnthropicClient {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl AnthropicClient {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, ModelApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ModelApiError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl ChatCompletionApi for AnthropicClient {
    async fn send(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ModelApiError> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("anthropic-version", "2023-06-01")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ModelApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == 429 || status == 529 || body.to_lowercase().contains("overloaded") {
                return Err(ModelApiError::Throttled(body));
            }
            return Err(ModelApiError::Api {
                status,
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ModelApiError::Transport(e.to_string()))
    }
}

/// Retry schedule for model invocation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Base delay; attempt i waits base * 2^i (capped), plus jitter
    pub base_delay: Duration,
    /// Upper bound on the pre-jitter delay
    pub max_delay: Duration,
    /// Jitter fraction: up to this share of the delay is added at random
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Pre-jitter delay for a 0-based attempt index
    pub fn backoff_base(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        exp.min(self.max_delay)
    }

    /// Full delay for an attempt: capped exponential plus random jitter
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.backoff_base(attempt);
        let jitter = base.as_secs_f64() * self.jitter * rand::thread_rng().gen::<f64>();
        base + Duration::from_secs_f64(jitter)
    }
}

/// Retrying wrapper around a chat-completion endpoint
pub struct ModelInvoker {
    api: Arc<dyn ChatCompletionApi>,
    model_id: String,
    policy: RetryPolicy,
}

impl ModelInvoker {
    pub fn new(api: Arc<dyn ChatCompletionApi>, model_id: String) -> Self {
        Self {
            api,
            model_id,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(
        api: Arc<dyn ChatCompletionApi>,
        model_id: String,
        policy: RetryPolicy,
    ) -> Self {
        Self { api, model_id, policy }
    }

    /// Submit the prompt and return generated text or a fixed error string.
    ///
    /// Retries are uniform across error classes; only the logging detail and
    /// the final-attempt message differ between throttling and other errors.
    pub async fn ask(&self, prompt: &str) -> String {
        let request_id = format!("req-{}", rand::thread_rng().gen_range(1000..=9999));
        let max = self.policy.max_attempts;

        for attempt in 0..max {
            info!(request_id, attempt = attempt + 1, max, "calling model endpoint");

            let request = ChatCompletionRequest {
                model: self.model_id.clone(),
                max_tokens: 4096,
                temperature: 0.7,
                messages: vec![ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                }],
            };

            match self.api.send(request).await {
                Ok(response) => match first_text(&response) {
                    Some(text) => {
                        info!(request_id, chars = text.len(), "model call succeeded");
                        return text;
                    }
                    None => {
                        error!(request_id, "model response envelope is missing content");
                        if attempt + 1 < max {
                            tokio::time::sleep(self.policy.base_delay).await;
                            continue;
                        }
                        return INVALID_RESPONSE_MESSAGE.to_string();
                    }
                },
                Err(ModelApiError::Throttled(msg)) => {
                    warn!(request_id, %msg, "model endpoint throttled");
                    if attempt + 1 < max {
                        let delay = self.policy.backoff_delay(attempt);
                        info!(
                            request_id,
                            delay_secs = delay.as_secs_f64(),
                            "rate limited, backing off"
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        return SERVICE_ERROR_MESSAGE.to_string();
                    }
                }
                Err(ModelApiError::Api { status, message }) => {
                    error!(request_id, status, %message, "model endpoint error");
                    if attempt + 1 < max {
                        tokio::time::sleep(self.policy.backoff_delay(attempt)).await;
                    } else {
                        return SERVICE_ERROR_MESSAGE.to_string();
                    }
                }
                Err(ModelApiError::Transport(msg)) => {
                    error!(request_id, %msg, "model transport error");
                    if attempt + 1 < max {
                        tokio::time::sleep(self.policy.backoff_delay(attempt)).await;
                    } else {
                        return UNEXPECTED_ERROR_MESSAGE.to_string();
                    }
                }
            }
        }

        // Every branch above returns on the final attempt, but keep a
        // distinct terminal message just in case
        error!(request_id, max, "maximum retries exceeded");
        RETRIES_EXHAUSTED_MESSAGE.to_string()
    }
}

/// Extract the first generated text segment from a response envelope
fn first_text(response: &ChatCompletionResponse) -> Option<String> {
    response
        .content
        .first()
        .filter(|block| !block.text.is_empty())
        .map(|block| block.text.clone())
}
