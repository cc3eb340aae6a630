//! Prompt construction and reply parsing for the SQL agent.
//!
//! ## Flow
//!
//! 1. [`sql_generation_messages`]: system prompt with the table description, then the question.
//!    The model replies `SQLQuery: <sql>` or `NO_SQL: <answer>`.
//! 2. [`extract_sql`] pulls the statement out of the reply; [`is_read_only`] gates execution.
//! 3. [`answer_messages`]: question, SQL and result table; the model replies in plain text.

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single chat message, one-to-one with one element of the OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Rows requested per query unless the question asks for a specific number.
pub const TOP_K: usize = 10;

/// Marker the model uses before the generated statement.
pub const SQL_MARKER: &str = "SQLQuery:";

/// Marker the model uses when the question needs no query.
pub const NO_SQL_MARKER: &str = "NO_SQL:";

const SQLITE_TEMPLATE: &str = r#"You are a SQLite expert. Given an input question, create one syntactically correct, read-only SQLite query that answers it.
Unless the user specifies in the question a specific number of examples to obtain, query for at most {top_k} results using the LIMIT clause. You can order the results to return the most informative data.
Never query for all columns from a table. Query only the columns needed to answer the question and wrap each column name in double quotes (") to denote them as delimited identifiers.
Only use column names you can see in the table description below, and pay attention to which column is in which table.
Counting questions must use COUNT(*) over the whole table, not a LIMIT-ed sample.

Reply in exactly this format:
SQLQuery: <the SQLite query>

If the question cannot be answered from this data, reply instead with:
NO_SQL: <a short plain-text answer>

Only use the following tables:
{table_info}"#;

const ANSWER_SYSTEM: &str = "You answer questions about a dataset using only the SQL result you are given. \
Reply in plain text without Markdown or formatting symbols, suitable for sending directly in Telegram. \
Keep the answer short and include the concrete numbers from the result.";

/// Messages asking the model for a SQL query.
pub fn sql_generation_messages(table_info: &str, question: &str) -> Vec<ChatMessage> {
    let system = SQLITE_TEMPLATE
        .replace("{top_k}", &TOP_K.to_string())
        .replace("{table_info}", table_info);
    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("Question: {}", question)),
    ]
}

/// Follow-up after a failed or rejected query, so the model can correct itself.
pub fn correction_message(sql: &str, error: &str) -> ChatMessage {
    ChatMessage::user(format!(
        "The query\n{}\nfailed with error: {}\nWrite a corrected query in the same format.",
        sql, error
    ))
}

/// Messages asking the model to phrase the final answer.
pub fn answer_messages(question: &str, sql: &str, result_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(ANSWER_SYSTEM),
        ChatMessage::user(format!(
            "Question: {}\n{} {}\nSQLResult:\n{}\nAnswer:",
            question, SQL_MARKER, sql, result_text
        )),
    ]
}

/// Returns the direct answer when the reply starts with [`NO_SQL_MARKER`].
pub fn no_sql_answer(reply: &str) -> Option<&str> {
    reply.trim().strip_prefix(NO_SQL_MARKER).map(str::trim)
}

/// Extracts the SQL statement from a model reply.
///
/// Accepts a fenced code block, a `SQLQuery:` marker, or a bare statement. Text after
/// `SQLResult:` or `Answer:` and trailing semicolons are dropped.
pub fn extract_sql(reply: &str) -> String {
    let mut text = reply.trim();

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        let body = after.find("```").map(|end| &after[..end]).unwrap_or(after);
        let body = body.trim_start();
        text = body
            .strip_prefix("sqlite")
            .or_else(|| body.strip_prefix("sql"))
            .unwrap_or(body)
            .trim();
    }

    if let Some(pos) = text.find(SQL_MARKER) {
        text = &text[pos + SQL_MARKER.len()..];
    }

    let end = text
        .find("SQLResult:")
        .or_else(|| text.find("Answer:"))
        .unwrap_or(text.len());

    text[..end].trim().trim_end_matches(';').trim().to_string()
}

const WRITE_KEYWORDS: [&str; 11] = [
    "insert", "update", "delete", "drop", "alter", "create", "attach", "detach", "pragma",
    "vacuum", "reindex",
];

/// Lowercased words outside string literals, quoted identifiers and comments, plus whether a
/// statement separator appears outside them.
fn scan_words(sql: &str) -> (Vec<String>, bool) {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut separator = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_alphanumeric() || c == '_' {
            current.extend(c.to_lowercase());
            continue;
        }
        if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        match c {
            ';' => separator = true,
            '\'' | '"' | '`' | '[' => {
                let close = if c == '[' { ']' } else { c };
                while let Some(inner) = chars.next() {
                    if inner == close {
                        // A doubled quote is an escaped quote, not the end.
                        if close != ']' && chars.peek() == Some(&close) {
                            chars.next();
                            continue;
                        }
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            _ => {}
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    (words, separator)
}

/// True for a single `SELECT` / `WITH` statement containing no data-modifying keyword.
///
/// Literals, quoted identifiers and comments are ignored. `replace` only counts as a write
/// when followed by `into`, since it is also a string function. Execution itself runs on a
/// query-only connection, so this gate mainly spares a round trip to the database.
pub fn is_read_only(sql: &str) -> bool {
    let sql = sql.trim().trim_end_matches(';');
    if sql.is_empty() {
        return false;
    }

    let (words, separator) = scan_words(sql);
    if separator {
        return false;
    }

    match words.first().map(String::as_str) {
        Some("select") | Some("with") => {}
        _ => return false,
    }
    let replace_into = words
        .windows(2)
        .any(|pair| pair[0] == "replace" && pair[1] == "into");
    !replace_into && !words.iter().any(|w| WRITE_KEYWORDS.contains(&w.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sql_with_marker() {
        let reply = "SQLQuery: SELECT COUNT(*) FROM df_total;\nSQLResult: ...";
        assert_eq!(extract_sql(reply), "SELECT COUNT(*) FROM df_total");
    }

    #[test]
    fn test_extract_sql_without_marker() {
        assert_eq!(extract_sql("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_extract_sql_from_code_fence() {
        let reply = "Here you go:\n```sql\nSELECT \"Sex\", COUNT(*) FROM df_total GROUP BY \"Sex\";\n```";
        assert_eq!(
            extract_sql(reply),
            "SELECT \"Sex\", COUNT(*) FROM df_total GROUP BY \"Sex\""
        );
    }

    #[test]
    fn test_extract_sql_marker_inside_fence() {
        let reply = "```\nSQLQuery: SELECT 2\n```";
        assert_eq!(extract_sql(reply), "SELECT 2");
    }

    #[test]
    fn test_extract_sql_stops_at_answer() {
        let reply = "SQLQuery: SELECT COUNT(*) FROM users\nAnswer: There are 100 users";
        assert_eq!(extract_sql(reply), "SELECT COUNT(*) FROM users");
    }

    #[test]
    fn test_is_read_only() {
        assert!(is_read_only("SELECT * FROM df_total LIMIT 10"));
        assert!(is_read_only("with t as (select 1) select * from t;"));
        assert!(!is_read_only("DROP TABLE df_total"));
        assert!(!is_read_only("SELECT 1; DELETE FROM df_total"));
        assert!(!is_read_only("WITH x AS (SELECT 1) DELETE FROM df_total"));
        assert!(!is_read_only("PRAGMA table_info(df_total)"));
        assert!(!is_read_only(""));
    }

    #[test]
    fn test_is_read_only_allows_keyword_substrings() {
        assert!(is_read_only("SELECT \"updated_at\", \"created_by\" FROM df_total"));
    }

    #[test]
    fn test_is_read_only_ignores_literals_and_functions() {
        assert!(is_read_only(
            "SELECT replace(\"name\", ' ', '') FROM df_total LIMIT 10"
        ));
        assert!(is_read_only(
            "SELECT COUNT(*) FROM df_total WHERE \"Educations\" LIKE '%update%'"
        ));
        assert!(is_read_only("SELECT * FROM df_total WHERE \"code\" = 'a;b'"));
        assert!(is_read_only("SELECT 'it''s; drop' AS s"));
        assert!(is_read_only("SELECT \"delete\" FROM df_total -- drop later"));
    }

    #[test]
    fn test_is_read_only_rejects_hidden_writes() {
        assert!(!is_read_only("WITH t AS (SELECT 1) REPLACE INTO df_total SELECT * FROM t"));
        assert!(!is_read_only("SELECT 'x'; DELETE FROM df_total"));
        assert!(!is_read_only("SELECT 1 /* ok */; DROP TABLE df_total"));
    }

    #[test]
    fn test_no_sql_answer() {
        assert_eq!(
            no_sql_answer("NO_SQL: The dataset has no salary data."),
            Some("The dataset has no salary data.")
        );
        assert_eq!(no_sql_answer("SQLQuery: SELECT 1"), None);
    }

    #[test]
    fn test_sql_generation_messages_fill_template() {
        let messages = sql_generation_messages("CREATE TABLE df_total (a INTEGER)", "How many?");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.contains("at most 10 results"));
        assert!(messages[0].content.contains("CREATE TABLE df_total (a INTEGER)"));
        assert!(!messages[0].content.contains("{table_info}"));
        assert_eq!(messages[1].content, "Question: How many?");
    }
}
