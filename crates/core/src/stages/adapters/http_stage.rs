//! Stage client backed by an OpenAI-compatible chat-completions endpoint.

use crate::stages::base::{StageClient, StageError, StageRequest};
use af_protocol::config_models::ApiConfig;
use af_protocol::stage_models::StageKind;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(750);

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Calls the inference service over HTTP.
///
/// Transport errors, HTTP 429 and 5xx responses are retried up to
/// `max_retries` times with a linearly growing delay. Everything else fails
/// on the first attempt.
pub struct HttpStageClient {
    client: reqwest::Client,
    config: ApiConfig,
    api_key: Option<String>,
    retry_delay: Duration,
}

impl HttpStageClient {
    /// Create a client, reading the API key from `config.api_key_env`.
    ///
    /// A missing key is not an error here; the client simply reports itself
    /// unavailable.
    pub fn new(config: ApiConfig) -> Result<Self, StageError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StageError::ExecutionError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            api_key,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn build_body(&self, request: &StageRequest) -> serde_json::Value {
        let mut messages = Vec::new();
        if !request.system_prompt.trim().is_empty() {
            messages.push(serde_json::json!({
                "role": "system",
                "content": request.system_prompt,
            }));
        }
        messages.push(serde_json::json!({
            "role": "user",
            "content": request.user_message,
        }));

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": self.config.max_tokens,
        });
        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        body
    }

    /// One HTTP round trip. The flag says whether the failure is worth retrying.
    async fn send_once(
        &self,
        api_key: &str,
        body: &serde_json::Value,
    ) -> Result<String, (StageError, bool)> {
        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| (StageError::ApiError(format!("Network error: {e}")), true))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| (StageError::ApiError(format!("Network error: {e}")), true))?;

        check_status(status, &body_text)?;

        let parsed: ChatResponse = serde_json::from_str(&body_text).map_err(|e| {
            (
                StageError::ResponseParseError(format!("Failed to parse response: {e}")),
                false,
            )
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            (
                StageError::ResponseParseError("Response contained no choices".to_string()),
                false,
            )
        })?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl StageClient for HttpStageClient {
    async fn check_availability(&self) -> bool {
        self.api_key.is_some()
    }

    async fn execute(&self, request: &StageRequest) -> Result<String, StageError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            StageError::NotAvailable(format!(
                "API key not set (expected in ${})",
                self.config.api_key_env
            ))
        })?;

        let body = self.build_body(request);
        let mut attempt: u32 = 0;

        loop {
            debug!(stage = %request.stage, attempt, model = %request.model, "sending stage request");

            match self.send_once(api_key, &body).await {
                Ok(raw) => return Ok(extract_content(request.stage, &raw)),
                Err((error, retryable)) if retryable && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(stage = %request.stage, attempt, error = %error, "retrying stage request");
                    tokio::time::sleep(self.retry_delay * attempt).await;
                }
                Err((error, _)) => return Err(error),
            }
        }
    }
}

/// Accept any 2xx response. Rate limits and server errors are retryable.
fn check_status(status: StatusCode, body: &str) -> Result<(), (StageError, bool)> {
    if status.is_success() {
        return Ok(());
    }
    let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
    Err((parse_http_error(status.as_u16(), body), retryable))
}

/// Map a non-2xx response to a stage error.
fn parse_http_error(status: u16, body: &str) -> StageError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect());

    match status {
        429 => StageError::RateLimited(detail),
        401 | 403 => StageError::NotAvailable(format!("Authentication failed: {detail}")),
        _ => StageError::ApiError(format!("HTTP {status}: {detail}")),
    }
}

/// Pull the usable payload out of a raw model reply.
///
/// Code-producing stages usually wrap the artifact in a fenced block; when one
/// is present only its body is kept. Other stages keep the whole reply.
pub fn extract_content(stage: StageKind, raw: &str) -> String {
    if matches!(stage, StageKind::Coder | StageKind::Reviewer) {
        if let Some(body) = first_fenced_block(raw) {
            return body.trim().to_string();
        }
    }
    raw.trim().to_string()
}

fn first_fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find("```")?;
    let after_fence = &raw[start + 3..];
    // Skip the language tag line.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}
