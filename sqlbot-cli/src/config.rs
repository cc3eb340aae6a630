//! Dataset and log locations from the environment.

use anyhow::Result;
use row_store::DEFAULT_TABLE;
use std::env;
use std::path::Path;

/// Paths resolved under `DATA_DIR` unless set explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: String,
    pub csv_path: String,
    pub db_path: String,
    pub table: String,
    pub log_file: String,
}

impl AppConfig {
    /// `DATA_DIR` (default `data`), `CSV_DATA_PATH`, `DB_PATH`, `DATASET_TABLE`, `LOG_FILE`.
    pub fn from_env() -> Result<Self> {
        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let in_data_dir = |file: &str| Path::new(&data_dir).join(file).to_string_lossy().into_owned();

        let csv_path = env::var("CSV_DATA_PATH").unwrap_or_else(|_| in_data_dir("df_total.csv"));
        let db_path = env::var("DB_PATH").unwrap_or_else(|_| in_data_dir("df_total.db"));
        let table = env::var("DATASET_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/sqlbot.log".to_string());

        let config = Self {
            data_dir,
            csv_path,
            db_path,
            table,
            log_file,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            anyhow::bail!("DATASET_TABLE is empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in ["DATA_DIR", "CSV_DATA_PATH", "DB_PATH", "DATASET_TABLE", "LOG_FILE"] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.csv_path, Path::new("data").join("df_total.csv").to_string_lossy());
        assert_eq!(config.db_path, Path::new("data").join("df_total.db").to_string_lossy());
        assert_eq!(config.table, "df_total");
        assert_eq!(config.log_file, "logs/sqlbot.log");
    }

    #[test]
    #[serial]
    fn test_data_dir_and_overrides() {
        clear_env();
        env::set_var("DATA_DIR", "/srv/sqlbot");
        env::set_var("DB_PATH", "/tmp/custom.db");
        env::set_var("DATASET_TABLE", "people");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.csv_path, "/srv/sqlbot/df_total.csv");
        assert_eq!(config.db_path, "/tmp/custom.db");
        assert_eq!(config.table, "people");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_blank_table_rejected() {
        clear_env();
        env::set_var("DATASET_TABLE", " ");
        assert!(AppConfig::from_env().is_err());
        clear_env();
    }
}
