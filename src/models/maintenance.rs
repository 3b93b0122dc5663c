//! Maintenance history entry models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Maintenance event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MaintenanceType {
    Preventivo,
    Correctivo,
    Predictivo,
    Inspeccion,
}

/// Image reference attached to a maintenance record. Uploads are handled
/// elsewhere; only the reference (filename or link) travels through here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    pub reference: String,
    pub caption: Option<String>,
    /// Date shown alongside the image, distinct from the upload date
    pub display_date: Option<NaiveDate>,
}

/// One maintenance event in a ficha's append-only history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceRecord {
    /// Time-ordered unique id derived from the creation timestamp
    pub id: String,
    /// Calendar date of the service event
    pub date: NaiveDate,
    pub maintenance_type: MaintenanceType,
    pub notes: String,
    pub parts_consumed: String,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl MaintenanceRecord {
    /// Generate a record id from its creation timestamp: sortable by
    /// creation time, with a short random suffix against same-millisecond
    /// collisions.
    pub fn new_id(created_at: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", created_at.format("%Y%m%d%H%M%S%3f"), &suffix[..8])
    }
}

/// Request body for logging a new maintenance event
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenanceRecord {
    pub date: NaiveDate,
    pub maintenance_type: MaintenanceType,
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub notes: String,
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub parts_consumed: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ids_are_time_ordered_and_unique() {
        let earlier = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 1).unwrap();
        let a = MaintenanceRecord::new_id(earlier);
        let b = MaintenanceRecord::new_id(later);
        assert!(a < b);

        let same_instant: Vec<String> = (0..16)
            .map(|_| MaintenanceRecord::new_id(earlier))
            .collect();
        let mut deduped = same_instant.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), same_instant.len());
    }

    #[test]
    fn test_status_wire_form() {
        // MaintenanceType serializes as its bare variant name
        let json = serde_json::to_string(&MaintenanceType::Preventivo).unwrap();
        assert_eq!(json, "\"Preventivo\"");
    }
}
