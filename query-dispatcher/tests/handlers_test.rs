//! Tests for the bot handlers: CommandHandler and DatasetQueryHandler.
//!
//! Uses a recording Bot, a RowStore on a temporary SQLite file and fake agents; no Telegram or
//! OpenAI access.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use query_dispatcher::handlers::{CommandHandler, DatasetQueryHandler, HELP_MESSAGE};
use query_dispatcher::{QueryDispatcher, RetryPolicy};
use row_store::RowStore;
use sql_agent::{AgentError, SqlAgent};
use sqlbot_core::{
    Bot, Chat, Handler, HandlerResponse, Message, MessageDirection, Result as CoreResult, User,
};

/// Records every reply instead of sending it.
#[derive(Default)]
struct RecordingBot {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingBot {
    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> CoreResult<()> {
        self.sent.lock().unwrap().push((chat.id, text.to_string()));
        Ok(())
    }
}

struct EchoAgent(&'static str);

#[async_trait]
impl SqlAgent for EchoAgent {
    async fn answer(&self, question: &str, _schema_context: &str) -> Result<String, AgentError> {
        Ok(format!("{} answered: {}", self.0, question))
    }

    fn model(&self) -> &str {
        self.0
    }
}

fn message(content: &str) -> Message {
    Message {
        id: "1".to_string(),
        user: User {
            id: 123,
            username: Some("ann".to_string()),
            first_name: Some("Ann".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        direction: MessageDirection::Incoming,
        created_at: Utc::now(),
    }
}

async fn setup(dir: &tempfile::TempDir) -> (Arc<RecordingBot>, Arc<QueryDispatcher>) {
    let csv_path = dir.path().join("df_total.csv");
    std::fs::write(&csv_path, "Sex,Age\nmale,30\nfemale,41\nmale,25\n").unwrap();
    let db_path = dir.path().join("df_total.db");
    let store = RowStore::open(db_path.to_str().unwrap(), "df_total")
        .await
        .unwrap();
    store.load_csv(&csv_path).await.unwrap();

    let dispatcher = QueryDispatcher::new(
        Arc::new(store),
        Arc::new(EchoAgent("gpt-4o-mini")),
        Arc::new(EchoAgent("gpt-3.5-turbo")),
    )
    .with_retry_policy(RetryPolicy::immediate(3));

    (Arc::new(RecordingBot::default()), Arc::new(dispatcher))
}

/// **Test: /start greets the user by first name and replies in the same chat.**
#[tokio::test]
async fn test_start_command() {
    let dir = tempfile::tempdir().unwrap();
    let (bot, dispatcher) = setup(&dir).await;
    let handler = CommandHandler::new(bot.clone(), dispatcher);

    let response = handler.handle(&message("/start")).await.unwrap();

    let sent = bot.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 456);
    assert!(sent[0].1.starts_with("Welcome Ann"));
    assert_eq!(response, HandlerResponse::Reply(sent[0].1.clone()));
}

/// **Test: /help@botname replies with the help text.**
#[tokio::test]
async fn test_help_command_with_bot_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let (bot, dispatcher) = setup(&dir).await;
    let handler = CommandHandler::new(bot.clone(), dispatcher);

    handler.handle(&message("/help@sqlbot")).await.unwrap();

    assert_eq!(bot.sent()[0].1, HELP_MESSAGE);
}

/// **Test: /info lists table name, row count and columns.**
#[tokio::test]
async fn test_info_command() {
    let dir = tempfile::tempdir().unwrap();
    let (bot, dispatcher) = setup(&dir).await;
    let handler = CommandHandler::new(bot.clone(), dispatcher);

    handler.handle(&message("/info")).await.unwrap();

    let text = &bot.sent()[0].1;
    assert!(text.contains("Table: df_total"));
    assert!(text.contains("Rows: 3"));
    assert!(text.contains("Columns (2): Sex, Age"));
}

/// **Test: /status reports readiness and both models.**
#[tokio::test]
async fn test_status_command() {
    let dir = tempfile::tempdir().unwrap();
    let (bot, dispatcher) = setup(&dir).await;
    let handler = CommandHandler::new(bot.clone(), dispatcher);

    handler.handle(&message("/status")).await.unwrap();

    let text = &bot.sent()[0].1;
    assert!(text.contains("✅ Dataset ready"));
    assert!(text.contains("Primary model: gpt-4o-mini"));
    assert!(text.contains("Fallback model: gpt-3.5-turbo"));
}

/// **Test: Unknown commands get a hint; plain text passes through.**
#[tokio::test]
async fn test_unknown_command_and_plain_text() {
    let dir = tempfile::tempdir().unwrap();
    let (bot, dispatcher) = setup(&dir).await;
    let handler = CommandHandler::new(bot.clone(), dispatcher);

    handler.handle(&message("/stats")).await.unwrap();
    let plain = handler.handle(&message("How many rows?")).await.unwrap();

    assert_eq!(
        bot.sent()[0].1,
        "Unknown command: stats. Send /help to see what I can do."
    );
    assert_eq!(plain, HandlerResponse::Continue);
    assert_eq!(bot.sent().len(), 1);
}

/// **Test: Free text goes through the dispatcher; the row-count shortcut hits the real table.**
#[tokio::test]
async fn test_query_handler_replies_with_dispatcher_answer() {
    let dir = tempfile::tempdir().unwrap();
    let (bot, dispatcher) = setup(&dir).await;
    let handler = DatasetQueryHandler::new(bot.clone(), dispatcher);

    let count = handler.handle(&message("How many rows are there?")).await.unwrap();
    let other = handler.handle(&message("Average age?")).await.unwrap();

    assert_eq!(
        count,
        HandlerResponse::Reply("There are 3 rows in the dataset.".to_string())
    );
    assert_eq!(
        other,
        HandlerResponse::Reply("gpt-4o-mini answered: Average age?".to_string())
    );
    assert_eq!(bot.sent().len(), 2);
}

/// **Test: Commands and blank messages are ignored by the query handler.**
#[tokio::test]
async fn test_query_handler_ignores_commands_and_blank_text() {
    let dir = tempfile::tempdir().unwrap();
    let (bot, dispatcher) = setup(&dir).await;
    let handler = DatasetQueryHandler::new(bot.clone(), dispatcher);

    assert_eq!(
        handler.handle(&message("/start")).await.unwrap(),
        HandlerResponse::Ignore
    );
    assert_eq!(
        handler.handle(&message("   ")).await.unwrap(),
        HandlerResponse::Ignore
    );
    assert!(bot.sent().is_empty());
}
