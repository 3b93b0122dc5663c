//! Equipment record ("ficha") models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::maintenance::MaintenanceRecord;

/// Freshness status of a ficha. Wire values are exactly "Verde"/"Rojo";
/// rendering and filtering depend on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Status {
    Verde,
    Rojo,
}

/// One equipment record as read from the table backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FichaRecord {
    /// Unique identifier, trimmed; case preserved for display
    pub ficha_id: String,
    pub model: String,
    pub location: String,
    /// Absent or unparseable dates are a valid state, not an error
    pub last_maintenance_date: Option<NaiveDate>,
}

/// Ficha augmented with the derived display fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FichaRow {
    pub ficha_id: String,
    pub model: String,
    pub location: String,
    pub last_maintenance_date: Option<NaiveDate>,
    /// Whole days since the last maintenance; null iff the date is null
    pub days_since_last: Option<i64>,
    pub status: Status,
    /// Last maintenance + 1 month + 15 days; null iff the date is null
    pub next_maintenance_projection: Option<NaiveDate>,
}

/// Detail view: the augmented row plus its maintenance history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FichaDetail {
    pub ficha: FichaRow,
    pub history: Vec<MaintenanceRecord>,
}
