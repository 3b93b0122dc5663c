//! Record-store collaborators for the equipment table and the maintenance
//! history. The service layer only sees these traits; which backend sits
//! behind them is a configuration decision.

pub mod excel;
pub mod history;
pub mod sheets;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;

use crate::config::{HistoryConfig, StoreBackend, StoreConfig};
use crate::error::AppResult;
use crate::models::HistoryFile;

/// Snapshot of the equipment table, cells as raw strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Source of the equipment table
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Read a consistent snapshot of the whole table
    async fn load(&self) -> AppResult<RawTable>;

    /// Set one ficha's last-maintenance date. Succeeds entirely or reports
    /// failure; the caller never observes a partial write.
    async fn update_last_maintenance(&self, ficha_id: &str, date: NaiveDate) -> AppResult<()>;
}

/// Append-only store of per-ficha maintenance records, loaded and saved
/// wholesale
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self) -> AppResult<HistoryFile>;
    async fn save(&self, history: &HistoryFile) -> AppResult<()>;
}

/// The two collaborators bundled for the service layer
#[derive(Clone)]
pub struct Store {
    pub table: Arc<dyn TableStore>,
    pub history: Arc<dyn HistoryStore>,
}

impl Store {
    /// Select backends from configuration
    pub fn from_config(store: &StoreConfig, history: &HistoryConfig) -> AppResult<Self> {
        let table: Arc<dyn TableStore> = match store.backend {
            StoreBackend::Excel => Arc::new(excel::ExcelTableStore::new(store.excel.clone())),
            StoreBackend::Sheets => Arc::new(sheets::SheetsTableStore::new(store.sheets.clone())?),
        };
        Ok(Self {
            table,
            history: Arc::new(history::JsonHistoryStore::new(history.path.clone().into())),
        })
    }
}
