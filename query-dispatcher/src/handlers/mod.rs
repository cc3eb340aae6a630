//! Chain handlers that expose the dispatcher to a chat transport.

mod command_handler;
mod logging_handler;
mod query_handler;

pub use command_handler::{CommandHandler, HELP_MESSAGE};
pub use logging_handler::LoggingHandler;
pub use query_handler::DatasetQueryHandler;
