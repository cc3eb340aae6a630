use openai_client::LlmError;
use thiserror::Error;

/// Failure kinds visible to the dispatcher: rate limiting (retryable) and everything else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("{0}")]
    Failed(String),
}

impl AgentError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AgentError::RateLimited(_))
    }
}

impl From<LlmError> for AgentError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited(msg) => AgentError::RateLimited(msg),
            other => AgentError::Failed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_llm_error() {
        assert!(AgentError::from(LlmError::RateLimited("429".into())).is_rate_limited());
        assert_eq!(
            AgentError::from(LlmError::EmptyResponse),
            AgentError::Failed("No response from model".to_string())
        );
    }
}
