//! # sqlbot-telegram
//!
//! Telegram layer for the dataset bot: teloxide → core adapters, [`sqlbot_core::Bot`]
//! implementation, token/API URL config, and the REPL runner that feeds a
//! [`handler_chain::HandlerChain`]. No dataset or model logic lives here.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{split_message, TelegramBotAdapter, MAX_MESSAGE_LEN};
pub use config::TelegramConfig;
pub use runner::run_repl;
