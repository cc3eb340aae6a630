//! # Query dispatcher
//!
//! [`QueryDispatcher::handle_query`] turns one free-text question into one reply string:
//! row-count questions are answered straight from the [`row_store::DatasetStore`]; everything else
//! goes to the primary [`sql_agent::SqlAgent`], then to the fallback when the primary stays
//! rate limited. Rate-limit retries follow [`RetryPolicy`].
//!
//! The [`handlers`] module wires the dispatcher into a `handler_chain::HandlerChain`.

mod dispatcher;
pub mod handlers;
mod retry;

pub use dispatcher::{
    classify, Outcome, QueryDispatcher, QueryRoute, EXHAUSTED_MESSAGE, MALE_COUNT_QUESTION,
    MALE_COUNT_TRIGGERS, ROW_COUNT_TRIGGERS,
};
pub use retry::RetryPolicy;
pub use sql_agent::Tier;
