//! SQL agent driven by a chat model.
//!
//! Generate a query → check it is read-only → run it → phrase the answer. A failed or rejected
//! query is sent back to the model for correction, up to `max_steps` query attempts. Rate-limit
//! errors from the model abort the run immediately so the caller's retry policy sees them.

use std::sync::Arc;

use async_trait::async_trait;
use openai_client::OpenAIClient;
use row_store::DatasetStore;
use tracing::{debug, info, instrument};

use crate::error::AgentError;
use crate::llm::{LlmClient, OpenAILlmClient};
use crate::prompt::{self, ChatMessage};
use crate::tier::AgentTier;
use crate::SqlAgent;

/// Query attempts per question (first try plus corrections).
pub const DEFAULT_MAX_STEPS: usize = 3;

/// Result rows shown to the model when phrasing the answer.
const MAX_RESULT_ROWS: usize = 50;

pub struct LlmSqlAgent {
    llm: Arc<dyn LlmClient>,
    tier: AgentTier,
    store: Arc<dyn DatasetStore>,
    max_steps: usize,
}

impl LlmSqlAgent {
    pub fn new(llm: Arc<dyn LlmClient>, tier: AgentTier, store: Arc<dyn DatasetStore>) -> Self {
        Self {
            llm,
            tier,
            store,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Agent for `tier` using an OpenAI-compatible client.
    pub fn openai(client: OpenAIClient, tier: AgentTier, store: Arc<dyn DatasetStore>) -> Self {
        let llm: Arc<dyn LlmClient> = Arc::new(OpenAILlmClient::new(client, &tier));
        Self::new(llm, tier, store)
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn tier(&self) -> &AgentTier {
        &self.tier
    }

    /// Verbose tiers log each step at info; others at debug.
    fn log_step(&self, step: &str, detail: &str) {
        if self.tier.verbose() {
            info!(tier = %self.tier.tier(), model = %self.tier.model(), step = step, "{}", detail);
        } else {
            debug!(tier = %self.tier.tier(), model = %self.tier.model(), step = step, "{}", detail);
        }
    }
}

#[async_trait]
impl SqlAgent for LlmSqlAgent {
    #[instrument(skip(self, question, schema_context), fields(tier = %self.tier.tier()))]
    async fn answer(&self, question: &str, schema_context: &str) -> Result<String, AgentError> {
        let mut messages = prompt::sql_generation_messages(schema_context, question);
        let mut last_error = String::from("no query produced");

        for attempt in 1..=self.max_steps {
            let reply = self.llm.complete(messages.clone()).await?;
            self.log_step("generate", &reply);

            if let Some(direct) = prompt::no_sql_answer(&reply) {
                self.log_step("no_sql", direct);
                return Ok(direct.to_string());
            }

            let sql = prompt::extract_sql(&reply);
            if !prompt::is_read_only(&sql) {
                last_error = "only a single read-only SELECT statement is allowed".to_string();
                self.log_step("rejected", &sql);
                messages.push(ChatMessage::assistant(reply));
                messages.push(prompt::correction_message(&sql, &last_error));
                continue;
            }

            match self.store.execute(&sql).await {
                Ok(result) => {
                    self.log_step(
                        "executed",
                        &format!("{} ({} rows)", sql, result.row_count()),
                    );
                    let result_text = result.to_text(MAX_RESULT_ROWS);
                    let answer = self
                        .llm
                        .complete(prompt::answer_messages(question, &sql, &result_text))
                        .await?;
                    let answer = answer.trim().to_string();
                    self.log_step("answer", &answer);
                    return Ok(answer);
                }
                Err(e) => {
                    last_error = e.to_string();
                    self.log_step(
                        "execute_failed",
                        &format!("attempt {}: {}: {}", attempt, sql, last_error),
                    );
                    messages.push(ChatMessage::assistant(reply));
                    messages.push(prompt::correction_message(&sql, &last_error));
                }
            }
        }

        Err(AgentError::Failed(format!(
            "no valid SQL after {} attempts: {}",
            self.max_steps, last_error
        )))
    }

    fn model(&self) -> &str {
        self.tier.model()
    }
}
