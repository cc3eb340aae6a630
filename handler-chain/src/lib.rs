//! # Handler chain
//!
//! Runs an ordered list of [`Handler`]s for each message: every `before` in order (a `false`
//! stops the chain), then `handle` until the first Stop or Reply, then every `after` in reverse
//! order with the final response.

use sqlbot_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler; handlers run in insertion order.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the first Stop or Reply from the handle phase, or Continue.
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        info!(message_id = %message.id, "step: handler_chain started");

        for handler in &self.handlers {
            if !handler.before(message).await? {
                let name = std::any::type_name_of_val(handler.as_ref());
                info!(handler = %name, "step: before returned false, chain stopped");
                return Ok(HandlerResponse::Stop);
            }
        }

        let mut final_response = HandlerResponse::Continue;
        for handler in &self.handlers {
            let name = std::any::type_name_of_val(handler.as_ref());
            let response = handler.handle(message).await?;
            debug!(handler = %name, response = ?response, "step: handler done");

            if matches!(response, HandlerResponse::Stop | HandlerResponse::Reply(_)) {
                info!(handler = %name, "step: handler chain stopped by handler");
                final_response = response;
                break;
            }
        }

        for handler in self.handlers.iter().rev() {
            handler.after(message, &final_response).await?;
        }

        info!(message_id = %message.id, "step: handler_chain finished");
        Ok(final_response)
    }
}
