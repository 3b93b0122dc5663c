//! Ficha listing, detail, and maintenance logging.
//!
//! One service orchestrates both record-store collaborators: the equipment
//! table and the maintenance history. Logging a maintenance event is the
//! only operation that touches both, and it is what keeps the table's
//! last-maintenance date in sync with the history.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    config::MaintenanceConfig,
    error::{AppError, AppResult},
    models::{CreateMaintenanceRecord, FichaDetail, FichaRecord, FichaRow, MaintenanceRecord},
    store::{RawTable, Store},
    table::{dates, resolver, status},
};

use super::settings::SettingsService;

/// Ids that mean "no record" rather than an identifier
const PLACEHOLDER_IDS: [&str; 3] = ["-", "n/a", "na"];

struct CachedTable {
    loaded_at: Instant,
    table: Arc<RawTable>,
}

#[derive(Clone)]
pub struct FichasService {
    store: Store,
    settings: SettingsService,
    excluded: Arc<HashSet<String>>,
    cache: Arc<RwLock<Option<CachedTable>>>,
    cache_ttl: Duration,
}

impl FichasService {
    pub fn new(store: Store, settings: SettingsService, config: &MaintenanceConfig) -> Self {
        let excluded = config
            .excluded_fichas
            .iter()
            .map(|id| id.trim().to_lowercase())
            .collect();
        Self {
            store,
            settings,
            excluded: Arc::new(excluded),
            cache: Arc::new(RwLock::new(None)),
            cache_ttl: Duration::from_secs(config.cache_ttl_seconds),
        }
    }

    /// Table snapshot, served from the in-process cache while fresh
    async fn snapshot(&self) -> AppResult<Arc<RawTable>> {
        if !self.cache_ttl.is_zero() {
            let guard = self.cache.read().await;
            if let Some(cached) = guard.as_ref() {
                if cached.loaded_at.elapsed() < self.cache_ttl {
                    return Ok(Arc::clone(&cached.table));
                }
            }
        }

        let table = Arc::new(self.store.table.load().await?);
        if !self.cache_ttl.is_zero() {
            *self.cache.write().await = Some(CachedTable {
                loaded_at: Instant::now(),
                table: Arc::clone(&table),
            });
        }
        Ok(table)
    }

    async fn invalidate_cache(&self) {
        *self.cache.write().await = None;
    }

    /// Probe the table backend (readiness check)
    pub async fn ping(&self) -> AppResult<()> {
        self.snapshot().await.map(|_| ())
    }

    fn is_working_id(&self, ficha_id: &str) -> bool {
        if ficha_id.is_empty() {
            return false;
        }
        let lower = ficha_id.to_lowercase();
        !PLACEHOLDER_IDS.contains(&lower.as_str()) && !self.excluded.contains(&lower)
    }

    /// Records in table order, minus blank, placeholder, and excluded ids
    fn collect_records(&self, table: &RawTable, columns: &resolver::ResolvedColumns) -> Vec<FichaRecord> {
        table
            .rows
            .iter()
            .filter_map(|row| {
                let cell = |idx: usize| -> String {
                    row.get(idx).map(String::as_str).unwrap_or("").trim().to_string()
                };
                let ficha_id = cell(columns.ficha);
                if !self.is_working_id(&ficha_id) {
                    return None;
                }
                Some(FichaRecord {
                    ficha_id,
                    model: cell(columns.modelo),
                    location: cell(columns.ubicacion),
                    last_maintenance_date: dates::parse_day_first(&cell(columns.fecha)),
                })
            })
            .collect()
    }

    /// All working fichas with derived status, in table order
    pub async fn list(&self) -> AppResult<Vec<FichaRow>> {
        self.list_as_of(Utc::now().date_naive()).await
    }

    async fn list_as_of(&self, today: NaiveDate) -> AppResult<Vec<FichaRow>> {
        let table = self.snapshot().await?;
        let columns = resolver::resolve_columns(&table.headers)?;
        let records = self.collect_records(&table, &columns);
        let threshold = self.settings.threshold_days().await;
        Ok(status::evaluate(records, threshold, today))
    }

    /// One ficha with its maintenance history. Excluded ids behave exactly
    /// like ids that are not in the table at all.
    pub async fn detail(&self, ficha_id: &str) -> AppResult<FichaDetail> {
        self.detail_as_of(ficha_id, Utc::now().date_naive()).await
    }

    async fn detail_as_of(&self, ficha_id: &str, today: NaiveDate) -> AppResult<FichaDetail> {
        let wanted = ficha_id.trim();
        let ficha = self
            .list_as_of(today)
            .await?
            .into_iter()
            .find(|row| row.ficha_id == wanted)
            .ok_or_else(|| AppError::NotFound(format!("Ficha {} not found", wanted)))?;

        let history = self.store.history.load().await?;
        Ok(FichaDetail {
            ficha,
            history: history.records_for(wanted).to_vec(),
        })
    }

    /// Log a maintenance event: update the ficha's last-maintenance date in
    /// the table backend and append the history entry. A failed table write
    /// is reported as-is; the history is not touched after one. A failed
    /// history write after a successful table write is likewise reported;
    /// neither write rolls the other back.
    pub async fn append_maintenance(
        &self,
        ficha_id: &str,
        request: CreateMaintenanceRecord,
    ) -> AppResult<MaintenanceRecord> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let wanted = ficha_id.trim().to_string();
        let table = self.snapshot().await?;
        let columns = resolver::resolve_columns(&table.headers)?;
        let editable = self
            .collect_records(&table, &columns)
            .iter()
            .any(|record| record.ficha_id == wanted);
        if !editable {
            return Err(AppError::NotFound(format!("Ficha {} not found", wanted)));
        }

        let created_at = Utc::now();
        let record = MaintenanceRecord {
            id: MaintenanceRecord::new_id(created_at),
            date: request.date,
            maintenance_type: request.maintenance_type,
            notes: request.notes,
            parts_consumed: request.parts_consumed,
            attachments: request.attachments,
            created_at,
            modified_at: created_at,
        };

        // Table first; the snapshot cache is stale either way.
        let table_write = self
            .store
            .table
            .update_last_maintenance(&wanted, record.date)
            .await;
        self.invalidate_cache().await;
        table_write?;

        let mut history = self.store.history.load().await?;
        history.append(&wanted, record.clone());
        self.store.history.save(&history).await?;

        tracing::info!(ficha = %wanted, record = %record.id, "maintenance recorded");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::history::HistoryFile;
    use crate::models::maintenance::MaintenanceType;
    use crate::models::Status;
    use crate::store::{MockHistoryStore, MockTableStore};
    use mockall::predicate::eq;

    fn raw_table() -> RawTable {
        RawTable {
            headers: vec![
                "Fecha último mantenimiento".to_string(),
                "Ficha".to_string(),
                "Modelo".to_string(),
                "Ubicación".to_string(),
            ],
            rows: vec![
                vec!["15/05/2025".into(), "TA-01".into(), "CAT 320".into(), "Taller".into()],
                vec!["sin fecha".into(), "TA-02".into(), "PC200".into(), "Obra Norte".into()],
                vec!["01/01/2025".into(), "BAJA-99".into(), "viejo".into(), "Depósito".into()],
                vec!["".into(), "-".into(), "".into(), "".into()],
                vec!["".into(), "".into(), "".into(), "".into()],
            ],
        }
    }

    fn maintenance_config(ttl: u64) -> MaintenanceConfig {
        MaintenanceConfig {
            threshold_days: 90,
            excluded_fichas: vec!["baja-99".to_string()],
            cache_ttl_seconds: ttl,
        }
    }

    fn service(table: MockTableStore, history: MockHistoryStore, ttl: u64) -> FichasService {
        let store = Store {
            table: Arc::new(table),
            history: Arc::new(history),
        };
        let settings = SettingsService::new(90).unwrap();
        FichasService::new(store, settings, &maintenance_config(ttl))
    }

    fn create_request(date: NaiveDate) -> CreateMaintenanceRecord {
        CreateMaintenanceRecord {
            date,
            maintenance_type: MaintenanceType::Preventivo,
            notes: "cambio de aceite".to_string(),
            parts_consumed: String::new(),
            attachments: vec![],
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_list_filters_and_derives_status() {
        let mut table = MockTableStore::new();
        table.expect_load().returning(|| Ok(raw_table()));
        let service = service(table, MockHistoryStore::new(), 0);

        let rows = service.list_as_of(ymd(2025, 6, 1)).await.unwrap();

        // Excluded, placeholder, and blank ids never appear
        let ids: Vec<&str> = rows.iter().map(|r| r.ficha_id.as_str()).collect();
        assert_eq!(ids, vec!["TA-01", "TA-02"]);

        assert_eq!(rows[0].days_since_last, Some(17));
        assert_eq!(rows[0].status, Status::Verde);
        assert_eq!(rows[0].next_maintenance_projection, Some(ymd(2025, 6, 30)));

        // Unparseable date degrades to null, never fails the batch
        assert_eq!(rows[1].last_maintenance_date, None);
        assert_eq!(rows[1].days_since_last, None);
        assert_eq!(rows[1].status, Status::Rojo);
    }

    #[tokio::test]
    async fn test_missing_column_aborts_loudly() {
        let mut table = MockTableStore::new();
        table.expect_load().returning(|| {
            Ok(RawTable {
                headers: vec!["Ficha".into(), "Modelo".into(), "Ubicación".into()],
                rows: vec![],
            })
        });
        let service = service(table, MockHistoryStore::new(), 0);

        let err = service.list_as_of(ymd(2025, 6, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::ColumnNotFound { .. }));
    }

    #[tokio::test]
    async fn test_detail_of_excluded_ficha_is_not_found() {
        let mut table = MockTableStore::new();
        table.expect_load().returning(|| Ok(raw_table()));
        let service = service(table, MockHistoryStore::new(), 0);

        // Present in the raw table, but in the exclusion set (any casing)
        let err = service.detail_as_of("BAJA-99", ymd(2025, 6, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_append_updates_table_and_history_in_sync() {
        let date = ymd(2025, 6, 1);

        let mut table = MockTableStore::new();
        table.expect_load().returning(|| Ok(raw_table()));
        table
            .expect_update_last_maintenance()
            .with(eq("TA-01"), eq(date))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut history = MockHistoryStore::new();
        history.expect_load().returning(|| Ok(HistoryFile::empty()));
        history
            .expect_save()
            .withf(move |h| {
                let records = h.records_for("TA-01");
                records.len() == 1 && records[0].date == date
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = service(table, history, 0);
        let record = service
            .append_maintenance("TA-01", create_request(date))
            .await
            .unwrap();
        assert_eq!(record.date, date);
        assert!(!record.id.is_empty());
    }

    #[tokio::test]
    async fn test_append_generates_unique_ids() {
        let date = ymd(2025, 6, 1);

        let mut table = MockTableStore::new();
        table.expect_load().returning(|| Ok(raw_table()));
        table
            .expect_update_last_maintenance()
            .returning(|_, _| Ok(()));

        let mut history = MockHistoryStore::new();
        history.expect_load().returning(|| Ok(HistoryFile::empty()));
        history.expect_save().returning(|_| Ok(()));

        let service = service(table, history, 0);
        let first = service
            .append_maintenance("TA-01", create_request(date))
            .await
            .unwrap();
        let second = service
            .append_maintenance("TA-01", create_request(date))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_append_to_excluded_ficha_is_rejected() {
        let mut table = MockTableStore::new();
        table.expect_load().returning(|| Ok(raw_table()));
        // No update/save expectations: the stores must not be written.
        let service = service(table, MockHistoryStore::new(), 0);

        let err = service
            .append_maintenance("BAJA-99", create_request(ymd(2025, 6, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_table_write_skips_history() {
        let mut table = MockTableStore::new();
        table.expect_load().returning(|| Ok(raw_table()));
        table
            .expect_update_last_maintenance()
            .returning(|_, _| Err(AppError::StoreWrite("sheet update returned 500".into())));

        // History store must stay untouched after a failed table write.
        let service = service(table, MockHistoryStore::new(), 0);
        let err = service
            .append_maintenance("TA-01", create_request(ymd(2025, 6, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreWrite(_)));
    }

    #[tokio::test]
    async fn test_snapshot_cache_hits_within_ttl_and_invalidates_on_write() {
        let date = ymd(2025, 6, 1);

        let mut table = MockTableStore::new();
        // Two loads total: one shared by the first two lists and the
        // append's existence check, one after invalidation.
        table.expect_load().times(2).returning(|| Ok(raw_table()));
        table
            .expect_update_last_maintenance()
            .returning(|_, _| Ok(()));

        let mut history = MockHistoryStore::new();
        history.expect_load().returning(|| Ok(HistoryFile::empty()));
        history.expect_save().returning(|_| Ok(()));

        let service = service(table, history, 300);
        service.list_as_of(date).await.unwrap();
        service.list_as_of(date).await.unwrap();
        service
            .append_maintenance("TA-01", create_request(date))
            .await
            .unwrap();
        service.list_as_of(date).await.unwrap();
    }
}
