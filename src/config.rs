//! Configuration management for the fichas server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which record-store backend holds the equipment table
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Excel,
    Sheets,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExcelStoreConfig {
    /// Path to the local workbook
    pub path: String,
    /// Sheet name; first sheet when unset
    pub sheet: Option<String>,
    /// Copy the workbook aside before each write
    pub backups: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetsStoreConfig {
    pub base_url: String,
    pub spreadsheet_id: String,
    /// Tab name, also used as the A1 fetch range
    pub sheet: String,
    pub api_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    #[serde(default)]
    pub excel: ExcelStoreConfig,
    #[serde(default)]
    pub sheets: SheetsStoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Path to the JSON maintenance-history file
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MaintenanceConfig {
    /// Freshness threshold in days (Verde while strictly below)
    pub threshold_days: u32,
    /// Ficha ids never shown and never editable (matched case-insensitively)
    pub excluded_fichas: Vec<String>,
    /// Time-to-live of the in-memory table snapshot; 0 disables caching
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub history: HistoryConfig,
    pub maintenance: MaintenanceConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix FICHAS_)
            .add_source(
                Environment::with_prefix("FICHAS")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override workbook path from EXCEL_PATH env var if present
            .set_override_option("store.excel.path", env::var("EXCEL_PATH").ok())?
            // Override spreadsheet id from SHEET_ID env var if present
            .set_override_option("store.sheets.spreadsheet_id", env::var("SHEET_ID").ok())?
            // Override API token from SHEETS_API_TOKEN env var if present
            .set_override_option("store.sheets.api_token", env::var("SHEETS_API_TOKEN").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for ExcelStoreConfig {
    fn default() -> Self {
        Self {
            path: "data/mantenimiento.xlsx".to_string(),
            sheet: None,
            backups: true,
        }
    }
}

impl Default for SheetsStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sheets.googleapis.com".to_string(),
            spreadsheet_id: String::new(),
            sheet: "Sheet1".to_string(),
            api_token: String::new(),
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            threshold_days: 90,
            excluded_fichas: Vec::new(),
            cache_ttl_seconds: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
