//! # sqlbot-core
//!
//! Core types and traits for the dataset bot: [`Bot`], [`Handler`], message and user types,
//! and tracing initialization. Transport-agnostic; used by sqlbot-telegram, handler-chain and
//! query-dispatcher.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{BotError, HandlerError, Result};
pub use logger::init_tracing;
pub use types::{
    Chat, Handler, HandlerResponse, Message, MessageDirection, ToCoreMessage, ToCoreUser, User,
};
