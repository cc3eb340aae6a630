//! # SQL agent
//!
//! Defines the [`SqlAgent`] trait that answers natural-language questions about the dataset,
//! the two [`AgentTier`]s (primary and fallback), and [`LlmSqlAgent`], which asks a chat model for
//! a SQLite query, runs it against a [`row_store::DatasetStore`] and asks the model to phrase the
//! answer.
//!
//! [`LlmClient`] is the model seam: [`OpenAILlmClient`] in production, scripted fakes in tests.

use async_trait::async_trait;

mod config;
mod error;
mod llm;
mod llm_agent;
pub mod prompt;
mod tier;

pub use config::AgentsConfig;
pub use error::AgentError;
pub use llm::{LlmClient, OpenAILlmClient};
pub use llm_agent::{LlmSqlAgent, DEFAULT_MAX_STEPS};
pub use prompt::{ChatMessage, MessageRole};
pub use tier::{AgentTier, Tier};

/// Answers a question about the dataset. Implementations may run zero or more SQL statements.
#[async_trait]
pub trait SqlAgent: Send + Sync {
    /// Returns a natural-language answer. `schema_context` describes the dataset table.
    async fn answer(&self, question: &str, schema_context: &str) -> Result<String, AgentError>;

    /// Model identifier, for logs and `/status`.
    fn model(&self) -> &str;
}
