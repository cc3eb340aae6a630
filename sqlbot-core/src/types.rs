//! Core types: user, chat, message, handler response, and Handler trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identity (id, username, names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Chat (channel or private) identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

/// A single incoming or outgoing text message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    pub direction: MessageDirection,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Returns the bot command name (without `/` and `@botname`) when the message is a command.
    pub fn command(&self) -> Option<&str> {
        let first = self.content.trim_start().split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

/// Direction of the message (from user or from bot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

/// Handler result for the chain. `Reply(text)` carries the response body so later handlers can use it in `after()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; no response body.
    Stop,
    /// Skip this handler, try next.
    Ignore,
    /// Stop the chain and attach the reply text that was sent.
    Reply(String),
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific message type to core [`Message`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

/// Single handler concept: optional before / handle / after. Chain runs all before → handle until Stop/Reply → all after (reverse).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs before the handle phase. Return false to stop the chain.
    async fn before(&self, _message: &Message) -> crate::error::Result<bool> {
        Ok(true)
    }
    /// Processes the message. Return Stop or Reply to end the handle phase. Default: Continue.
    async fn handle(&self, _message: &Message) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
    /// Runs after the handle phase (reverse order), with the final response.
    async fn after(
        &self,
        _message: &Message,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str) -> Message {
        Message {
            id: "1".to_string(),
            user: User {
                id: 1,
                username: None,
                first_name: None,
                last_name: None,
            },
            chat: Chat {
                id: 1,
                chat_type: "private".to_string(),
            },
            content: content.to_string(),
            direction: MessageDirection::Incoming,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_command_plain() {
        assert_eq!(message("/start").command(), Some("start"));
        assert_eq!(message("  /info extra args").command(), Some("info"));
    }

    #[test]
    fn test_command_with_bot_suffix() {
        assert_eq!(message("/help@dataset_bot").command(), Some("help"));
    }

    #[test]
    fn test_command_none_for_text() {
        assert_eq!(message("How many rows?").command(), None);
        assert_eq!(message("").command(), None);
        assert_eq!(message("/").command(), None);
    }
}
