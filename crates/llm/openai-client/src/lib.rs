//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for deterministic chat completion against OpenAI-compatible
//! endpoints. Failures are classified into [`LlmError`] so callers can tell rate limiting apart
//! from every other failure. The HTTP-level backoff built into async-openai is switched off: a
//! 429 comes back to the caller on the first attempt and retry policy lives with the caller.

use std::sync::Arc;
use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::error::{ApiError, OpenAIError};
use async_openai::types::CreateChatCompletionRequestArgs;
use async_openai::Client;
use thiserror::Error;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};

/// API error `type` or `code` values that mean "slow down" or "out of quota".
const RATE_LIMIT_TYPES: [&str; 4] = ["rate_limit_exceeded", "insufficient_quota", "requests", "tokens"];

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_ascii() {
        return "***".to_string();
    }
    format!("{}***{}", &token[..7], &token[len - 4..])
}

/// Failure of a chat-completion call.
#[derive(Error, Debug)]
pub enum LlmError {
    /// HTTP 429 or an API error of a rate-limit / quota type.
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("No response from model")]
    EmptyResponse,
}

impl LlmError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimited(_))
    }
}

/// True when an API error body describes rate limiting or exhausted quota.
pub fn is_rate_limit_api_error(error: &ApiError) -> bool {
    let marked = [error.r#type.as_deref(), error.code.as_deref()]
        .into_iter()
        .flatten()
        .any(|value| RATE_LIMIT_TYPES.contains(&value));
    if marked {
        return true;
    }
    let message = error.message.to_lowercase();
    message.contains("rate limit") || message.contains("exceeded your current quota")
}

impl From<OpenAIError> for LlmError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::ApiError(api) => {
                if is_rate_limit_api_error(&api) {
                    LlmError::RateLimited(api.message)
                } else {
                    LlmError::Api(api.message)
                }
            }
            OpenAIError::Reqwest(e) => {
                if e.status().map(|s| s.as_u16()) == Some(429) {
                    LlmError::RateLimited(e.to_string())
                } else {
                    LlmError::Transport(e.to_string())
                }
            }
            OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg),
            other => LlmError::Api(other.to_string()),
        }
    }
}

/// OpenAI-compatible chat client. Holds the API key only for masked logging.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<OpenAIConfig>>,
    api_key_for_logging: String,
}

impl OpenAIClient {
    /// Builds a client for the default OpenAI base URL.
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.clone());
        Self::from_config(config, api_key)
    }

    /// Builds a client with a custom base URL (e.g. a proxy or compatible provider).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.clone())
            .with_api_base(base_url);
        Self::from_config(config, api_key)
    }

    fn from_config(config: OpenAIConfig, api_key: String) -> Self {
        // max_elapsed_time of zero turns every transient failure into a permanent one.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        let client = Client::with_config(config).with_backoff(no_retry);
        Self {
            client: Arc::new(client),
            api_key_for_logging: api_key,
        }
    }

    /// Sends one chat completion request and returns the first choice's text.
    pub async fn chat_completion(
        &self,
        model: &str,
        temperature: f32,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<String, LlmError> {
        tracing::debug!(
            model = %model,
            temperature = temperature,
            message_count = messages.len(),
            api_key = %mask_token(&self.api_key_for_logging),
            "OpenAI chat_completion request"
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .temperature(temperature)
            .messages(messages)
            .build()?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::trace!(request_json = %json, "OpenAI chat_completion request JSON");
        }

        let response = self.client.chat().create(request).await.map_err(|e| {
            let err = LlmError::from(e);
            tracing::warn!(model = %model, rate_limited = err.is_rate_limited(), error = %err, "OpenAI chat_completion failed");
            err
        })?;

        if let Some(ref u) = response.usage {
            tracing::debug!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI chat_completion usage"
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(value: serde_json::Value) -> ApiError {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_rate_limit_type_is_rate_limited() {
        let err = LlmError::from(OpenAIError::ApiError(api_error(serde_json::json!({
            "message": "Rate limit reached for gpt-4o-mini",
            "type": "requests",
            "param": null,
            "code": "rate_limit_exceeded"
        }))));
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_insufficient_quota_is_rate_limited() {
        let err = LlmError::from(OpenAIError::ApiError(api_error(serde_json::json!({
            "message": "You exceeded your current quota, please check your plan.",
            "type": "insufficient_quota",
            "param": null,
            "code": "insufficient_quota"
        }))));
        assert!(matches!(err, LlmError::RateLimited(_)));
    }

    #[test]
    fn test_message_only_rate_limit() {
        let api = api_error(serde_json::json!({
            "message": "Rate limit exceeded, try again later",
            "type": null,
            "param": null,
            "code": null
        }));
        assert!(is_rate_limit_api_error(&api));
    }

    /// Compatible proxies may put the rate-limit marker only in `code`.
    #[test]
    fn test_rate_limit_code_with_other_type() {
        let err = LlmError::from(OpenAIError::ApiError(api_error(serde_json::json!({
            "message": "Too many requests, slow down",
            "type": "server_error",
            "param": null,
            "code": "rate_limit_exceeded"
        }))));
        assert!(err.is_rate_limited());
        assert!(matches!(err, LlmError::RateLimited(ref m) if m == "Too many requests, slow down"));
    }

    #[test]
    fn test_other_api_error_is_not_rate_limited() {
        let err = LlmError::from(OpenAIError::ApiError(api_error(serde_json::json!({
            "message": "The model `gpt-9` does not exist",
            "type": "invalid_request_error",
            "param": null,
            "code": "model_not_found"
        }))));
        assert!(matches!(err, LlmError::Api(ref m) if m.contains("gpt-9")));
    }

    #[test]
    fn test_invalid_argument_maps_to_invalid_request() {
        let err = LlmError::from(OpenAIError::InvalidArgument("bad".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(_)));
        assert!(!err.is_rate_limited());
    }
}
