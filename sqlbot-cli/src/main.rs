//! sqlbot: run the Telegram bot, answer one question, or rebuild the dataset table.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use query_dispatcher::QueryDispatcher;
use row_store::{DatasetStore, RowStore};
use sql_agent::AgentsConfig;
use sqlbot_cli::{build_dispatcher, build_handler_chain, load_row_store, AppConfig, Cli, Commands};
use sqlbot_core::{init_tracing, Bot};
use sqlbot_telegram::{run_repl, TelegramBotAdapter, TelegramConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    init_tracing(&config.log_file)?;

    match cli.command {
        Commands::Run { token } => handle_run(&config, token).await,
        Commands::Ask { question } => handle_ask(&config, &question.join(" ")).await,
        Commands::Load { with_aux_schema } => handle_load(&config, with_aux_schema).await,
    }
}

async fn prepare_dispatcher(config: &AppConfig) -> Result<QueryDispatcher> {
    let agents = AgentsConfig::from_env().context("Load agent config (GAPGPT_API_KEY, models)")?;
    let store: Arc<dyn DatasetStore> = Arc::new(load_row_store(config).await?);
    Ok(build_dispatcher(store, &agents))
}

async fn handle_run(config: &AppConfig, token: Option<String>) -> Result<()> {
    let telegram = TelegramConfig::from_env(token)?;
    telegram.validate()?;

    let dispatcher = Arc::new(prepare_dispatcher(config).await?);
    let teloxide_bot = telegram.build_bot()?;
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let chain = build_handler_chain(bot, dispatcher);

    info!("Bot started successfully");
    run_repl(teloxide_bot, chain).await
}

async fn handle_ask(config: &AppConfig, question: &str) -> Result<()> {
    let dispatcher = prepare_dispatcher(config).await?;
    let answer = dispatcher.handle_query(question).await;
    println!("{}", answer);
    Ok(())
}

async fn handle_load(config: &AppConfig, with_aux_schema: bool) -> Result<()> {
    let store: RowStore = load_row_store(config).await?;
    if with_aux_schema {
        store
            .ensure_aux_schema()
            .await
            .context("Failed to create auxiliary tables")?;
    }
    let rows = store.count_rows().await?;
    println!("Loaded {} rows into {} ({})", rows, config.table, config.db_path);
    Ok(())
}
