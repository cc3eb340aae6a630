//! Command-line arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sqlbot")]
#[command(about = "Ask questions about a CSV dataset over Telegram", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reload the dataset and run the Telegram bot (token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Reload the dataset and answer one question on stdout.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Rebuild the SQLite dataset table from the CSV file.
    Load {
        /// Also create the auxiliary jobs/items tables.
        #[arg(long)]
        with_aux_schema: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_collects_words() {
        let cli = Cli::try_parse_from(["sqlbot", "ask", "how", "many", "rows"]).unwrap();
        match cli.command {
            Commands::Ask { question } => assert_eq!(question.join(" "), "how many rows"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_run_and_load() {
        let cli = Cli::try_parse_from(["sqlbot", "run", "--token", "abc"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { token: Some(ref t) } if t == "abc"));

        let cli = Cli::try_parse_from(["sqlbot", "load", "--with-aux-schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Load { with_aux_schema: true }));

        assert!(Cli::try_parse_from(["sqlbot", "ask"]).is_err());
    }
}
