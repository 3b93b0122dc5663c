//! Remote sheet backend over the spreadsheet values HTTP API.
//!
//! Reads the whole tab in one GET and writes the last-maintenance date as a
//! single-cell range update. The base URL comes from configuration so tests
//! can point the store at a stub server.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{RawTable, TableStore};
use crate::config::SheetsStoreConfig;
use crate::error::{AppError, AppResult};
use crate::table::resolver;

pub struct SheetsTableStore {
    http: reqwest::Client,
    config: SheetsStoreConfig,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsTableStore {
    pub fn new(config: SheetsStoreConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.config.base_url, self.config.spreadsheet_id, range
        )
    }

    async fn fetch_values(&self) -> AppResult<Vec<Vec<String>>> {
        let response = self
            .http
            .get(self.values_url(&self.config.sheet))
            .bearer_auth(&self.config.api_token)
            .send()
            .await
            .map_err(|e| AppError::StoreRead(format!("sheet request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::StoreRead(format!(
                "sheet read returned {}",
                response.status()
            )));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| AppError::StoreRead(format!("invalid sheet response: {}", e)))?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }
}

#[async_trait]
impl TableStore for SheetsTableStore {
    async fn load(&self) -> AppResult<RawTable> {
        let mut values = self.fetch_values().await?;
        if values.is_empty() {
            return Ok(RawTable::default());
        }
        let headers = values.remove(0);
        // The API trims trailing empty cells per row; pad back out so
        // column indices stay valid.
        let rows = values
            .into_iter()
            .map(|mut row| {
                row.resize(headers.len(), String::new());
                row
            })
            .collect();
        Ok(RawTable { headers, rows })
    }

    async fn update_last_maintenance(&self, ficha_id: &str, date: NaiveDate) -> AppResult<()> {
        let values = self.fetch_values().await?;
        let (headers, rows) = match values.split_first() {
            Some(split) => split,
            None => return Err(AppError::NotFound(format!("Ficha {} not found in sheet", ficha_id))),
        };

        let columns = resolver::resolve_columns(headers)?;
        let row_idx = rows
            .iter()
            .position(|row| {
                row.get(columns.ficha)
                    .map(|cell| cell.trim() == ficha_id)
                    .unwrap_or(false)
            })
            .ok_or_else(|| AppError::NotFound(format!("Ficha {} not found in sheet", ficha_id)))?;

        // +2: one for the header row, one for 1-based sheet rows
        let cell_range = format!(
            "{}!{}{}",
            self.config.sheet,
            column_letters(columns.fecha),
            row_idx + 2
        );
        let body = json!({
            "range": cell_range,
            "majorDimension": "ROWS",
            "values": [[date.format("%d/%m/%Y").to_string()]],
        });

        let response = self
            .http
            .put(format!(
                "{}?valueInputOption=USER_ENTERED",
                self.values_url(&cell_range)
            ))
            .bearer_auth(&self.config.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::StoreWrite(format!("sheet update failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::StoreWrite(format!(
                "sheet update returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// 0-based column index to A1 letters (0 -> A, 26 -> AA)
fn column_letters(index: usize) -> String {
    let mut letters = String::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters
}
