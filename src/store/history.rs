//! JSON file backend for the maintenance history.
//!
//! The document is loaded and saved wholesale; migration from the legacy
//! shape happens once, at load. Saves go through a temp file and a rename.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use super::HistoryStore;
use crate::error::{AppError, AppResult};
use crate::models::history::{self, HistoryFile};

pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn load(&self) -> AppResult<HistoryFile> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::StoreRead(format!(
                        "history file {} is not valid JSON: {}",
                        self.path.display(),
                        e
                    ))
                })?;
                history::migrate(value)
            }
            // No history yet is a normal state for a fresh deployment
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HistoryFile::empty()),
            Err(e) => Err(AppError::StoreRead(format!(
                "cannot read history file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, history: &HistoryFile) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::StoreWrite(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        let bytes = serde_json::to_vec_pretty(history)
            .map_err(|e| AppError::Internal(format!("cannot serialize history: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
            AppError::StoreWrite(format!("cannot write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::StoreWrite(format!(
                "cannot replace history file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }
}
