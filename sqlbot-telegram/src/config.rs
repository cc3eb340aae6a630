//! Telegram connection settings from `BOT_TOKEN` / `TELEGRAM_BOT_TOKEN` and `TELEGRAM_API_URL`.

use anyhow::Result;
use std::env;

pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
}

impl TelegramConfig {
    /// `token` overrides the environment when given.
    pub fn from_env(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN")
                .or_else(|_| env::var("TELEGRAM_BOT_TOKEN"))
                .map_err(|_| anyhow::anyhow!("BOT_TOKEN (or TELEGRAM_BOT_TOKEN) not set"))?,
        };
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        Ok(Self {
            bot_token,
            telegram_api_url,
        })
    }

    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
        }
    }

    /// Rejects an empty token and a `TELEGRAM_API_URL` that is not a valid URL.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("Telegram bot token is empty");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        Ok(())
    }

    /// teloxide Bot for this token, pointed at the custom API URL when set.
    pub fn build_bot(&self) -> Result<teloxide::Bot> {
        let bot = teloxide::Bot::new(self.bot_token.clone());
        Ok(match self.telegram_api_url {
            Some(ref url_str) => bot.set_api_url(reqwest::Url::parse(url_str)?),
            None => bot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "BOT_TOKEN",
            "TELEGRAM_BOT_TOKEN",
            "TELEGRAM_API_URL",
            "TELOXIDE_API_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_with_token() {
        let config = TelegramConfig::with_token("test_token".to_string());
        assert_eq!(config.bot_token, "test_token");
        assert!(config.telegram_api_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_token_fallback() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "alt_token");

        let config = TelegramConfig::from_env(None).unwrap();
        assert_eq!(config.bot_token, "alt_token");

        let config = TelegramConfig::from_env(Some("cli_token".to_string())).unwrap();
        assert_eq!(config.bot_token, "cli_token");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_token() {
        clear_env();
        assert!(TelegramConfig::from_env(None).is_err());
    }

    #[test]
    #[serial]
    fn test_validate_telegram_api_url() {
        clear_env();
        env::set_var("BOT_TOKEN", "test_token");
        env::set_var("TELEGRAM_API_URL", "not-a-valid-url");
        let config = TelegramConfig::from_env(None).unwrap();
        assert!(config.validate().is_err());

        env::set_var("TELEGRAM_API_URL", "http://127.0.0.1:8081");
        let config = TelegramConfig::from_env(None).unwrap();
        assert!(config.validate().is_ok());
        clear_env();
    }
}
