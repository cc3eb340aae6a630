//! Logging initialization: full fmt format (level, target, fields) teed to console and file.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Initializes the global tracing subscriber.
///
/// Console and log file receive the same fmt output. Level comes from `RUST_LOG`
/// (e.g. `info`, `debug`, `query_dispatcher=debug`); default `info`. Load `.env` before calling,
/// otherwise `RUST_LOG` from the file has no effect. The log file's parent directory is created
/// when missing.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    let file = Arc::new(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let writer = io::stdout.and(file);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_span_events(FmtSpan::NONE)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_file(false)
        .with_line_number(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sqlbot.log");
        // A subscriber may already be installed by another test; only the file side effect matters.
        let _ = init_tracing(path.to_str().unwrap());
        assert!(path.exists());
    }
}
