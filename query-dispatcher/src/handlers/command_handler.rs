//! Slash commands: `/start`, `/help`, `/info`, `/status`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sql_agent::Tier;
use sqlbot_core::{Bot, Handler, HandlerError, HandlerResponse, Message, Result};
use tracing::{info, instrument, warn};

use crate::dispatcher::QueryDispatcher;

pub const HELP_MESSAGE: &str = "📖 How to use this bot

Send a question about the dataset in plain English and I will look it up.

Examples:
• How many rows are in the dataset?
• How many men are in the dataset?
• What is the most common education level?
• Show the average age grouped by sex

Commands:
/start - Welcome message
/help - This help
/info - Table name, row count and columns
/status - Dataset and model status";

/// Answers the bot commands; other messages continue down the chain.
pub struct CommandHandler {
    bot: Arc<dyn Bot>,
    dispatcher: Arc<QueryDispatcher>,
}

impl CommandHandler {
    pub fn new(bot: Arc<dyn Bot>, dispatcher: Arc<QueryDispatcher>) -> Self {
        Self { bot, dispatcher }
    }

    fn start_text(message: &Message) -> String {
        let name = message
            .user
            .first_name
            .as_deref()
            .or(message.user.username.as_deref())
            .unwrap_or("there");
        format!(
            "Welcome {} to the Dataset Analysis Bot! 🤖\n\n\
             I answer natural-language questions about the loaded dataset by turning them into SQL.\n\n\
             Quick start:\n\
             • Try: \"How many rows are in the dataset?\"\n\
             • Or: \"How many men are in the dataset?\"\n\n\
             Commands:\n\
             /help - Show detailed help\n\
             /info - Dataset information\n\
             /status - Check dataset and model status",
            name
        )
    }

    async fn info_text(&self) -> String {
        match self.dispatcher.store().table_info().await {
            Ok(info) => format!(
                "📊 Dataset information\n\nTable: {}\nRows: {}\nColumns ({}): {}",
                info.table_name,
                info.row_count,
                info.columns.len(),
                info.column_names().join(", ")
            ),
            Err(e) => {
                warn!(error = %e, "Failed to read table info");
                format!("❌ Could not read dataset information: {}", e)
            }
        }
    }

    async fn status_text(&self) -> String {
        let store = self.dispatcher.store();
        let dataset = if store.is_ready().await {
            format!("✅ Dataset ready (table {})", store.table_name())
        } else {
            format!("❌ Dataset not ready (table {})", store.table_name())
        };
        format!(
            "🔍 Bot status\n\n{}\nPrimary model: {}\nFallback model: {}\n\nLast updated: {}",
            dataset,
            self.dispatcher.agent(Tier::Primary).model(),
            self.dispatcher.agent(Tier::Fallback).model(),
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(command) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };

        let text = match command {
            "start" => Self::start_text(message),
            "help" => HELP_MESSAGE.to_string(),
            "info" => self.info_text().await,
            "status" => self.status_text().await,
            other => format!(
                "{}. Send /help to see what I can do.",
                HandlerError::UnknownCommand(other.to_string())
            ),
        };

        info!(user_id = message.user.id, command = %command, "Command handled");
        self.bot.reply_to(message, &text).await?;
        Ok(HandlerResponse::Reply(text))
    }
}
