//! Freshness status derivation.
//!
//! Pure function of (rows, threshold, reference date). The caller supplies
//! "today"; the engine never reads ambient time, which keeps every status
//! decision reproducible in tests.

use chrono::{Days, Months, NaiveDate};

use crate::models::{FichaRecord, FichaRow, Status};

/// Projected next maintenance date: one calendar month (end-of-month
/// clamped) plus fifteen days after the last maintenance.
pub fn next_maintenance(last: NaiveDate) -> NaiveDate {
    last + Months::new(1) + Days::new(15)
}

/// Augment each record with days elapsed, Verde/Rojo status, and the
/// projected next maintenance date, as of `today`.
///
/// Status is Verde only while days elapsed is strictly below the
/// threshold; a missing or unparseable date is always Rojo. Input order is
/// preserved; sorting is a presentation concern.
pub fn evaluate(records: Vec<FichaRecord>, threshold_days: u32, today: NaiveDate) -> Vec<FichaRow> {
    records
        .into_iter()
        .map(|record| {
            let days_since_last = record
                .last_maintenance_date
                .map(|date| (today - date).num_days());
            let status = match days_since_last {
                Some(days) if days < i64::from(threshold_days) => Status::Verde,
                _ => Status::Rojo,
            };
            let next = record.last_maintenance_date.map(next_maintenance);
            FichaRow {
                ficha_id: record.ficha_id,
                model: record.model,
                location: record.location,
                last_maintenance_date: record.last_maintenance_date,
                days_since_last,
                status,
                next_maintenance_projection: next,
            }
        })
        .collect()
}
