use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
