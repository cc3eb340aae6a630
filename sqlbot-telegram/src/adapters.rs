//! Conversions from teloxide types to sqlbot_core types.

use sqlbot_core::{Chat, Message, MessageDirection, ToCoreMessage, ToCoreUser, User};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`]. Non-text messages get empty content.
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> TelegramMessageWrapper<'a> {
    fn chat_type(&self) -> &'static str {
        let chat = &self.0.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_supergroup() {
            "supergroup"
        } else if chat.is_group() {
            "group"
        } else {
            "channel"
        }
    }
}

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        Message {
            id: self.0.id.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or(User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: self.chat_type().to_string(),
            },
            content: self.0.text().unwrap_or("").to_string(),
            direction: MessageDirection::Incoming,
            created_at: self.0.date,
        }
    }
}
