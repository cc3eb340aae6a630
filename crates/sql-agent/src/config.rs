//! Agent configuration loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

use crate::llm_agent::DEFAULT_MAX_STEPS;
use crate::tier::AgentTier;

pub const DEFAULT_API_BASE: &str = "https://api.gapgpt.app/v1";
pub const DEFAULT_PRIMARY_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-3.5-turbo";

/// Credentials and models for both agent tiers.
#[derive(Debug, Clone)]
pub struct AgentsConfig {
    pub api_key: String,
    pub api_base: String,
    pub primary_model: String,
    pub fallback_model: String,
    pub max_steps: usize,
}

impl AgentsConfig {
    /// Load from environment variables. `GAPGPT_API_KEY` wins over `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GAPGPT_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .context("GAPGPT_API_KEY (or OPENAI_API_KEY) not set")?;
        let api_base = env::var("GAPGPT_API_BASE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let primary_model =
            env::var("PRIMARY_MODEL").unwrap_or_else(|_| DEFAULT_PRIMARY_MODEL.to_string());
        let fallback_model =
            env::var("FALLBACK_MODEL").unwrap_or_else(|_| DEFAULT_FALLBACK_MODEL.to_string());
        let max_steps = env::var("AGENT_MAX_STEPS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_STEPS);

        let config = Self {
            api_key,
            api_base,
            primary_model,
            fallback_model,
            max_steps,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("API key is empty");
        }
        if self.max_steps == 0 {
            anyhow::bail!("AGENT_MAX_STEPS must be at least 1");
        }
        Ok(())
    }

    pub fn primary_tier(&self) -> AgentTier {
        AgentTier::primary(self.primary_model.clone())
    }

    pub fn fallback_tier(&self) -> AgentTier {
        AgentTier::fallback(self.fallback_model.clone())
    }
}
