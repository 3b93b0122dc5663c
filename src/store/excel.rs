//! Local Excel workbook backend.
//!
//! Reads snapshots with calamine and writes the single last-maintenance
//! cell back with umya-spreadsheet: copy the workbook aside, edit the cell,
//! write to a temp file, rename over the original.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;

use super::{RawTable, TableStore};
use crate::config::ExcelStoreConfig;
use crate::error::{AppError, AppResult};
use crate::table::resolver;

pub struct ExcelTableStore {
    config: ExcelStoreConfig,
}

impl ExcelTableStore {
    pub fn new(config: ExcelStoreConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TableStore for ExcelTableStore {
    async fn load(&self) -> AppResult<RawTable> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || {
            read_table(Path::new(&config.path), config.sheet.as_deref())
        })
        .await
        .map_err(|e| AppError::Internal(format!("workbook read task failed: {}", e)))?
    }

    async fn update_last_maintenance(&self, ficha_id: &str, date: NaiveDate) -> AppResult<()> {
        let config = self.config.clone();
        let ficha_id = ficha_id.to_string();
        tokio::task::spawn_blocking(move || write_last_maintenance(&config, &ficha_id, date))
            .await
            .map_err(|e| AppError::Internal(format!("workbook write task failed: {}", e)))?
    }
}

/// Cell to text. Datetime cells come back day-first so the date parser
/// reads them like any hand-typed cell.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

fn read_table(path: &Path, sheet: Option<&str>) -> AppResult<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::StoreRead(format!("cannot open workbook {}: {}", path.display(), e)))?;

    let names = workbook.sheet_names().to_owned();
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => names
            .first()
            .cloned()
            .ok_or_else(|| AppError::StoreRead(format!("workbook {} has no sheets", path.display())))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::StoreRead(format!("cannot read sheet '{}': {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn write_last_maintenance(config: &ExcelStoreConfig, ficha_id: &str, date: NaiveDate) -> AppResult<()> {
    let path = Path::new(&config.path);

    if config.backups {
        // A failed backup should not block the write itself.
        if let Err(e) = backup_copy(path) {
            tracing::warn!("workbook backup copy failed for {}: {}", path.display(), e);
        }
    }

    let mut book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| AppError::StoreWrite(format!("cannot open workbook {}: {}", path.display(), e)))?;

    let sheet = match config.sheet.as_deref() {
        Some(name) => book.get_sheet_by_name_mut(name),
        None => book.get_sheet_mut(&0),
    }
    .ok_or_else(|| AppError::StoreWrite(format!("worksheet not found in {}", path.display())))?;

    let highest_column = sheet.get_highest_column();
    let highest_row = sheet.get_highest_row();

    let headers: Vec<String> = (1..=highest_column)
        .map(|col| sheet.get_value((col, 1)).trim().to_string())
        .collect();
    let columns = resolver::resolve_columns(&headers)?;
    let ficha_col = columns.ficha as u32 + 1;
    let fecha_col = columns.fecha as u32 + 1;

    let row = (2..=highest_row)
        .find(|row| sheet.get_value((ficha_col, *row)).trim() == ficha_id)
        .ok_or_else(|| AppError::NotFound(format!("Ficha {} not found in workbook", ficha_id)))?;

    sheet
        .get_cell_mut((fecha_col, row))
        .set_value(date.format("%d/%m/%Y").to_string());

    let tmp = path.with_extension("xlsx.tmp");
    umya_spreadsheet::writer::xlsx::write(&book, &tmp)
        .map_err(|e| AppError::StoreWrite(format!("cannot write workbook {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path)
        .map_err(|e| AppError::StoreWrite(format!("cannot replace workbook {}: {}", path.display(), e)))?;

    Ok(())
}

fn backup_copy(path: &Path) -> std::io::Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("workbook.xlsx");
    let backup = path.with_file_name(format!("{}.{}.bak", file_name, stamp));
    fs::copy(path, &backup)?;
    Ok(backup)
}
