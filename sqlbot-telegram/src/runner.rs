//! REPL: each Telegram message becomes a core Message and runs through the HandlerChain.

use anyhow::Result;
use handler_chain::HandlerChain;
use sqlbot_core::ToCoreMessage;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use crate::adapters::TelegramMessageWrapper;

/// Runs until the process is stopped. Messages are handled inline, one at a time per update;
/// chain errors are logged and never end the loop.
#[instrument(skip(bot, handler_chain))]
pub async fn run_repl(bot: teloxide::Bot, handler_chain: HandlerChain) -> Result<()> {
    match bot.get_me().await {
        Ok(me) => info!(
            username = %me.user.username.as_deref().unwrap_or("unknown"),
            "Connected to Telegram"
        ),
        Err(e) => error!(error = %e, "get_me failed, starting REPL anyway"),
    }

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = handler_chain.clone();

        async move {
            let core_msg = TelegramMessageWrapper(&msg).to_core();

            if msg.text().is_none() {
                info!(
                    user_id = core_msg.user.id,
                    chat_id = core_msg.chat.id,
                    "Ignoring non-text message"
                );
                return respond(());
            }

            info!(
                user_id = core_msg.user.id,
                chat_id = core_msg.chat.id,
                message_id = %core_msg.id,
                "step: processing message"
            );
            if let Err(e) = chain.handle(&core_msg).await {
                error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
            }
            respond(())
        }
    })
    .await;

    Ok(())
}
