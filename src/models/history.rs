//! Versioned maintenance-history file schema.
//!
//! The history store persists one JSON document holding every ficha's
//! maintenance entries. Older deployments wrote a bare map of ficha id to
//! entry list with Spanish field names and plain-string photo lists; that
//! shape is migrated once at load time instead of being shape-sniffed at
//! every call site.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::maintenance::{Attachment, MaintenanceRecord, MaintenanceType};
use crate::table::dates::parse_day_first;
use crate::table::resolver::normalize;

pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// The whole history document, loaded and saved wholesale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryFile {
    pub schema_version: u32,
    /// Entries per ficha id, oldest first
    pub fichas: HashMap<String, Vec<MaintenanceRecord>>,
}

impl HistoryFile {
    pub fn empty() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            fichas: HashMap::new(),
        }
    }

    pub fn records_for(&self, ficha_id: &str) -> &[MaintenanceRecord] {
        self.fichas
            .get(ficha_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn append(&mut self, ficha_id: &str, record: MaintenanceRecord) {
        self.fichas
            .entry(ficha_id.to_string())
            .or_default()
            .push(record);
    }
}

/// Turn a raw JSON document into the current schema.
///
/// A document carrying `schema_version` must be the current version;
/// anything newer is a load error, never silently accepted. A document
/// without a version marker is the legacy (v1) bare map and gets migrated.
pub fn migrate(value: Value) -> AppResult<HistoryFile> {
    let obj = value
        .as_object()
        .ok_or_else(|| AppError::StoreRead("history file is not a JSON object".to_string()))?;

    match obj.get("schema_version").and_then(Value::as_u64) {
        Some(version) if version == u64::from(CURRENT_SCHEMA_VERSION) => {
            serde_json::from_value(value.clone())
                .map_err(|e| AppError::StoreRead(format!("invalid history file: {}", e)))
        }
        Some(version) => Err(AppError::StoreRead(format!(
            "unsupported history schema version {} (current is {})",
            version, CURRENT_SCHEMA_VERSION
        ))),
        None => migrate_legacy(obj),
    }
}

/// v1: `{ "<ficha>": [ { fecha, tipo, notas, repuestos, fotos: ["a.jpg"] } ] }`
fn migrate_legacy(obj: &serde_json::Map<String, Value>) -> AppResult<HistoryFile> {
    let mut fichas = HashMap::new();
    for (ficha_id, entries) in obj {
        let entries = entries.as_array().ok_or_else(|| {
            AppError::StoreRead(format!("legacy history for '{}' is not a list", ficha_id))
        })?;
        let mut records = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            records.push(migrate_legacy_entry(ficha_id, idx, entry)?);
        }
        fichas.insert(ficha_id.clone(), records);
    }
    tracing::info!("migrated legacy history file (v1) with {} fichas", fichas.len());
    Ok(HistoryFile {
        schema_version: CURRENT_SCHEMA_VERSION,
        fichas,
    })
}

fn migrate_legacy_entry(ficha_id: &str, idx: usize, entry: &Value) -> AppResult<MaintenanceRecord> {
    let field = |name: &str| entry.get(name).and_then(Value::as_str).unwrap_or_default();

    let date = parse_day_first(field("fecha")).ok_or_else(|| {
        AppError::StoreRead(format!(
            "legacy history entry {} of '{}' has unreadable fecha '{}'",
            idx,
            ficha_id,
            field("fecha")
        ))
    })?;

    let created_at = entry
        .get("creado")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| {
            DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).unwrap(), Utc)
        });

    let id = entry
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}-{:03}", date.format("%Y%m%d"), idx));

    let attachments = entry
        .get("fotos")
        .and_then(Value::as_array)
        .map(|fotos| {
            fotos
                .iter()
                .filter_map(Value::as_str)
                .map(|reference| Attachment {
                    reference: reference.to_string(),
                    caption: None,
                    display_date: None,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(MaintenanceRecord {
        id,
        date,
        maintenance_type: legacy_tipo(field("tipo")),
        notes: field("notas").to_string(),
        parts_consumed: field("repuestos").to_string(),
        attachments,
        created_at,
        modified_at: created_at,
    })
}

fn legacy_tipo(raw: &str) -> MaintenanceType {
    match normalize(raw).as_str() {
        "preventivo" => MaintenanceType::Preventivo,
        "predictivo" => MaintenanceType::Predictivo,
        "inspeccion" => MaintenanceType::Inspeccion,
        // Legacy files often left the type blank; unplanned work is the
        // safest bucket for those.
        _ => MaintenanceType::Correctivo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_current_version_roundtrip() {
        let mut file = HistoryFile::empty();
        file.append(
            "TA-01",
            MaintenanceRecord {
                id: "20250601100000000-abcd1234".to_string(),
                date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                maintenance_type: MaintenanceType::Preventivo,
                notes: "cambio de aceite".to_string(),
                parts_consumed: "filtro".to_string(),
                attachments: vec![],
                created_at: Utc::now(),
                modified_at: Utc::now(),
            },
        );
        let value = serde_json::to_value(&file).unwrap();
        let back = migrate(value).unwrap();
        assert_eq!(back.records_for("TA-01").len(), 1);
        assert_eq!(back.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_legacy_map_is_migrated() {
        let legacy = json!({
            "TA-01": [
                {
                    "fecha": "15/05/2024",
                    "tipo": "Preventivo",
                    "notas": "engrase general",
                    "repuestos": "grasa",
                    "fotos": ["antes.jpg", "despues.jpg"]
                },
                {
                    "fecha": "01/06/2024",
                    "tipo": "",
                    "notas": ""
                }
            ]
        });
        let file = migrate(legacy).unwrap();
        assert_eq!(file.schema_version, CURRENT_SCHEMA_VERSION);
        let records = file.records_for("TA-01");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].maintenance_type, MaintenanceType::Preventivo);
        assert_eq!(records[0].attachments.len(), 2);
        assert_eq!(records[0].attachments[0].reference, "antes.jpg");
        assert_eq!(records[0].attachments[0].caption, None);
        // Blank tipo falls back to Correctivo; ids are synthesized
        assert_eq!(records[1].maintenance_type, MaintenanceType::Correctivo);
        assert_eq!(records[1].id, "20240601-001");
    }

    #[test]
    fn test_future_version_rejected() {
        let err = migrate(json!({ "schema_version": 3, "fichas": {} })).unwrap_err();
        assert!(matches!(err, AppError::StoreRead(_)));
    }

    #[test]
    fn test_legacy_bad_fecha_is_loud() {
        let err = migrate(json!({ "TA-01": [{ "fecha": "???" }] })).unwrap_err();
        assert!(matches!(err, AppError::StoreRead(_)));
    }

    #[test]
    fn test_records_for_unknown_ficha_is_empty() {
        assert!(HistoryFile::empty().records_for("nope").is_empty());
    }
}
