//! Free-text questions: runs the dispatcher and replies with its answer.

use std::sync::Arc;

use async_trait::async_trait;
use sqlbot_core::{Bot, Handler, HandlerResponse, Message, Result};
use tracing::{info, instrument};

use crate::dispatcher::QueryDispatcher;

pub struct DatasetQueryHandler {
    bot: Arc<dyn Bot>,
    dispatcher: Arc<QueryDispatcher>,
}

impl DatasetQueryHandler {
    pub fn new(bot: Arc<dyn Bot>, dispatcher: Arc<QueryDispatcher>) -> Self {
        Self { bot, dispatcher }
    }
}

#[async_trait]
impl Handler for DatasetQueryHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let text = message.content.trim();
        if text.is_empty() || message.command().is_some() {
            return Ok(HandlerResponse::Ignore);
        }

        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            "Dispatching dataset question"
        );
        let reply = self.dispatcher.handle_query(text).await;
        self.bot.reply_to(message, &reply).await?;
        Ok(HandlerResponse::Reply(reply))
    }
}
