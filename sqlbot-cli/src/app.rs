//! Startup wiring shared by the subcommands: row store, agent tiers, dispatcher, handler chain.

use std::sync::Arc;

use anyhow::{Context, Result};
use handler_chain::HandlerChain;
use openai_client::{mask_token, OpenAIClient};
use query_dispatcher::handlers::{CommandHandler, DatasetQueryHandler, LoggingHandler};
use query_dispatcher::QueryDispatcher;
use row_store::{DatasetStore, RowStore};
use sql_agent::{AgentsConfig, LlmSqlAgent, SqlAgent};
use sqlbot_core::Bot;
use tracing::info;

use crate::config::AppConfig;

/// Opens the SQLite file and replaces the dataset table with the CSV contents.
pub async fn load_row_store(config: &AppConfig) -> Result<RowStore> {
    let store = RowStore::open(&config.db_path, config.table.clone())
        .await
        .with_context(|| format!("Failed to open row store at {}", config.db_path))?;
    let rows = store
        .load_csv(&config.csv_path)
        .await
        .with_context(|| format!("Failed to load CSV from {}", config.csv_path))?;
    info!(
        db_path = %config.db_path,
        table = %config.table,
        rows = rows,
        "Row store ready"
    );
    Ok(store)
}

/// Both agent tiers over one OpenAI-compatible client.
pub fn build_dispatcher(store: Arc<dyn DatasetStore>, agents: &AgentsConfig) -> QueryDispatcher {
    info!(
        api_base = %agents.api_base,
        api_key = %mask_token(&agents.api_key),
        primary_model = %agents.primary_model,
        fallback_model = %agents.fallback_model,
        "Building agent tiers"
    );
    let client = OpenAIClient::with_base_url(agents.api_key.clone(), agents.api_base.clone());

    let primary: Arc<dyn SqlAgent> = Arc::new(
        LlmSqlAgent::openai(client.clone(), agents.primary_tier(), store.clone())
            .with_max_steps(agents.max_steps),
    );
    let fallback: Arc<dyn SqlAgent> = Arc::new(
        LlmSqlAgent::openai(client, agents.fallback_tier(), store.clone())
            .with_max_steps(agents.max_steps),
    );

    QueryDispatcher::new(store, primary, fallback)
}

/// Logging, then commands, then free-text questions.
pub fn build_handler_chain(bot: Arc<dyn Bot>, dispatcher: Arc<QueryDispatcher>) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(CommandHandler::new(bot.clone(), dispatcher.clone())))
        .add_handler(Arc::new(DatasetQueryHandler::new(bot, dispatcher)))
}
