//! Data models for the fichas server

pub mod ficha;
pub mod history;
pub mod maintenance;

// Re-export commonly used types
pub use ficha::{FichaDetail, FichaRecord, FichaRow, Status};
pub use history::HistoryFile;
pub use maintenance::{Attachment, CreateMaintenanceRecord, MaintenanceRecord, MaintenanceType};
