//! # sqlbot-cli
//!
//! Argument parsing, path config and startup wiring for the `sqlbot` binary.

pub mod app;
pub mod cli;
pub mod config;

pub use app::{build_dispatcher, build_handler_chain, load_row_store};
pub use cli::{Cli, Commands};
pub use config::AppConfig;
