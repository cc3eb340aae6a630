//! Query dispatcher: keyword shortcut, gender rewrite, tiered delegation with retry.
//!
//! Every call ends in exactly one [`Outcome`]:
//!
//! ```text
//! START → classify ─┬─ RowCount ──► count_rows ──► DirectAnswer | Error
//!                   └─ Agent ──► primary (≤ N attempts) ─┬─ Success(primary)
//!                                                         ├─ Error
//!                                                         └─ rate limited ──► fallback (≤ N) ─┬─ Success(fallback)
//!                                                                                              ├─ Error
//!                                                                                              └─ Exhausted
//! ```
//!
//! Only rate-limit failures are retried; each tier has its own attempt budget.

use std::fmt;
use std::sync::Arc;

use row_store::DatasetStore;
use sql_agent::{AgentError, SqlAgent, Tier};
use tracing::{error, info, instrument, warn};

use crate::retry::RetryPolicy;

/// Lowercase phrases answered by counting rows directly.
pub const ROW_COUNT_TRIGGERS: [&str; 3] = ["how many rows", "row count", "number of rows"];

/// Lowercase phrases that replace the question with [`MALE_COUNT_QUESTION`].
pub const MALE_COUNT_TRIGGERS: [&str; 2] = ["how many man", "how many men"];

pub const MALE_COUNT_QUESTION: &str = "How many male individuals are in the dataset? Please count rows where the gender/sex column indicates male.";

pub const EXHAUSTED_MESSAGE: &str =
    "⚠️ Rate limits reached on both GapGPT models. Please check your quota and try again later.";

/// Where a question goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRoute {
    /// Answered by `SELECT COUNT(*)`; never reaches an agent.
    RowCount,
    /// Delegated to the agent tiers with this (possibly rewritten) question.
    Agent { question: String },
}

/// Matches on a lowercased copy; the original text is kept for delegation.
/// The row-count check runs first, so "row count of men" counts rows.
pub fn classify(text: &str) -> QueryRoute {
    let lowered = text.to_lowercase();
    if ROW_COUNT_TRIGGERS.iter().any(|t| lowered.contains(t)) {
        return QueryRoute::RowCount;
    }
    let question = if MALE_COUNT_TRIGGERS.iter().any(|t| lowered.contains(t)) {
        MALE_COUNT_QUESTION.to_string()
    } else {
        text.to_string()
    };
    QueryRoute::Agent { question }
}

/// Terminal state of one `handle_query` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    DirectAnswer,
    Success(Tier),
    Exhausted,
    Error,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::DirectAnswer => write!(f, "direct_answer"),
            Outcome::Success(tier) => write!(f, "success_{}", tier),
            Outcome::Exhausted => write!(f, "exhausted"),
            Outcome::Error => write!(f, "error"),
        }
    }
}

fn unexpected_error(err: impl fmt::Display) -> String {
    format!("❌ An unexpected error occurred: {}", err)
}

/// Turns a question into a reply. Holds no mutable state; share it behind an `Arc`.
pub struct QueryDispatcher {
    store: Arc<dyn DatasetStore>,
    primary: Arc<dyn SqlAgent>,
    fallback: Arc<dyn SqlAgent>,
    retry_policy: RetryPolicy,
}

impl QueryDispatcher {
    pub fn new(
        store: Arc<dyn DatasetStore>,
        primary: Arc<dyn SqlAgent>,
        fallback: Arc<dyn SqlAgent>,
    ) -> Self {
        Self {
            store,
            primary,
            fallback,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn store(&self) -> &Arc<dyn DatasetStore> {
        &self.store
    }

    pub fn agent(&self, tier: Tier) -> &Arc<dyn SqlAgent> {
        match tier {
            Tier::Primary => &self.primary,
            Tier::Fallback => &self.fallback,
        }
    }

    /// Always returns a user-facing string; store and agent failures become messages.
    pub async fn handle_query(&self, text: &str) -> String {
        let (reply, outcome) = self.dispatch(text).await;
        info!(outcome = %outcome, reply_len = reply.len(), "Query handled");
        reply
    }

    /// Like [`Self::handle_query`], also returning the terminal state.
    #[instrument(skip(self, text))]
    pub async fn dispatch(&self, text: &str) -> (String, Outcome) {
        match classify(text) {
            QueryRoute::RowCount => match self.store.count_rows().await {
                Ok(n) => {
                    info!(rows = n, "Answered by row count shortcut");
                    (
                        format!("There are {} rows in the dataset.", n),
                        Outcome::DirectAnswer,
                    )
                }
                Err(e) => {
                    error!(error = %e, "Row count failed");
                    (format!("❌ Error counting rows: {}", e), Outcome::Error)
                }
            },
            QueryRoute::Agent { question } => self.delegate(&question).await,
        }
    }

    async fn delegate(&self, question: &str) -> (String, Outcome) {
        let schema = match self.store.schema_context().await {
            Ok(schema) => schema,
            Err(e) => {
                error!(error = %e, "Schema lookup failed");
                return (unexpected_error(e), Outcome::Error);
            }
        };

        for tier in [Tier::Primary, Tier::Fallback] {
            match self.invoke_with_retry(tier, question, &schema).await {
                Ok(answer) => return (answer, Outcome::Success(tier)),
                Err(e) if e.is_rate_limited() => {
                    warn!(tier = %tier, error = %e, "Rate limit retries exhausted");
                }
                Err(e) => {
                    error!(tier = %tier, error = %e, "Agent failed");
                    return (unexpected_error(e), Outcome::Error);
                }
            }
        }

        (EXHAUSTED_MESSAGE.to_string(), Outcome::Exhausted)
    }

    /// Calls the tier's agent, retrying only rate-limit failures under the retry policy.
    /// Returns the last error once the attempts run out.
    pub async fn invoke_with_retry(
        &self,
        tier: Tier,
        question: &str,
        schema_context: &str,
    ) -> Result<String, AgentError> {
        let agent = self.agent(tier);
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            info!(tier = %tier, attempt = attempt, model = %agent.model(), "Invoking agent");
            match agent.answer(question, schema_context).await {
                Ok(answer) => return Ok(answer),
                Err(e) if e.is_rate_limited() && attempt < max_attempts => {
                    let delay = self.retry_policy.delay_for(attempt);
                    warn!(
                        tier = %tier,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_row_count_any_case() {
        assert_eq!(classify("How Many Rows are there?"), QueryRoute::RowCount);
        assert_eq!(classify("what is the ROW COUNT"), QueryRoute::RowCount);
        assert_eq!(classify("number of rows please"), QueryRoute::RowCount);
    }

    #[test]
    fn test_classify_rewrites_men_questions() {
        for text in ["How many men are there?", "how many man work here"] {
            assert_eq!(
                classify(text),
                QueryRoute::Agent {
                    question: MALE_COUNT_QUESTION.to_string()
                }
            );
        }
    }

    #[test]
    fn test_classify_row_count_wins_over_rewrite() {
        assert_eq!(classify("row count of men"), QueryRoute::RowCount);
    }

    #[test]
    fn test_classify_keeps_original_case() {
        assert_eq!(
            classify("Average AGE by Sex?"),
            QueryRoute::Agent {
                question: "Average AGE by Sex?".to_string()
            }
        );
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Success(Tier::Fallback).to_string(), "success_fallback");
        assert_eq!(Outcome::DirectAnswer.to_string(), "direct_answer");
    }
}
