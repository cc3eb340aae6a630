//! [`sqlbot_core::Bot`] over teloxide. Tests substitute a recording Bot instead.
//!
//! Texts longer than one Telegram message are sent as consecutive parts.

use async_trait::async_trait;
use sqlbot_core::{Bot as CoreBot, BotError, Chat, Message, Result};
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ReplyParameters};
use tracing::debug;

/// Telegram's per-message text limit, in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Splits `text` into parts of at most `limit` UTF-16 units, preferring line breaks.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(2);
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    // Byte offset in `current` just after the last newline.
    let mut last_break = None;

    for c in text.chars() {
        let len = c.len_utf16();
        if current_len + len > limit {
            match last_break {
                Some(at) if at > 0 => {
                    let rest = current.split_off(at);
                    let head = current.trim_end();
                    if !head.is_empty() {
                        parts.push(head.to_string());
                    }
                    current = rest;
                }
                _ => parts.push(std::mem::take(&mut current)),
            }
            current_len = current.encode_utf16().count();
            last_break = None;
            if current_len + len > limit {
                parts.push(std::mem::take(&mut current));
                current_len = 0;
            }
        }
        current.push(c);
        current_len += len;
        if c == '\n' {
            last_break = Some(current.len());
        }
    }
    if !current.is_empty() || parts.is_empty() {
        parts.push(current);
    }
    parts
}

pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// The underlying teloxide::Bot, for direct API use.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        for part in split_message(text, MAX_MESSAGE_LEN) {
            self.bot
                .send_message(ChatId(chat.id), part)
                .await
                .map_err(|e| BotError::Bot(e.to_string()))?;
        }
        Ok(())
    }

    /// Quotes the original message when its id is numeric; otherwise sends to the chat.
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        let Ok(id) = message.id.parse::<i32>() else {
            return self.send_message(&message.chat, text).await;
        };
        let parts = split_message(text, MAX_MESSAGE_LEN);
        debug!(
            chat_id = message.chat.id,
            message_id = id,
            parts = parts.len(),
            "Sending reply"
        );
        // Only the first part quotes the question.
        let mut parts = parts.into_iter();
        if let Some(first) = parts.next() {
            self.bot
                .send_message(ChatId(message.chat.id), first)
                .reply_parameters(ReplyParameters::new(MessageId(id)))
                .await
                .map_err(|e| BotError::Bot(e.to_string()))?;
        }
        for part in parts {
            self.bot
                .send_message(ChatId(message.chat.id), part)
                .await
                .map_err(|e| BotError::Bot(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_part() {
        assert_eq!(
            split_message("There are 4 rows in the dataset.", MAX_MESSAGE_LEN),
            vec!["There are 4 rows in the dataset.".to_string()]
        );
        assert_eq!(split_message("", MAX_MESSAGE_LEN), vec![String::new()]);
    }

    #[test]
    fn test_long_answer_fits_telegram_limit() {
        let answer = "row\n".repeat(3000);
        let parts = split_message(&answer, MAX_MESSAGE_LEN);

        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.encode_utf16().count() <= MAX_MESSAGE_LEN));
        assert!(parts.iter().all(|p| p.lines().all(|l| l == "row")));
        assert_eq!(parts.iter().map(|p| p.lines().count()).sum::<usize>(), 3000);
    }

    #[test]
    fn test_split_without_line_breaks() {
        let parts = split_message(&"a".repeat(10), 4);
        assert_eq!(parts, vec!["aaaa", "aaaa", "aa"]);
    }

    #[test]
    fn test_split_counts_utf16_units() {
        // Each emoji is two UTF-16 units.
        let parts = split_message("😀😀😀", 4);
        assert_eq!(parts, vec!["😀😀", "😀"]);

        let parts = split_message("\nabc😀", 4);
        assert!(parts.iter().all(|p| p.encode_utf16().count() <= 4));
        assert_eq!(parts, vec!["abc", "😀"]);
    }
}
