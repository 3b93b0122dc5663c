//! Fichas Maintenance Tracking Server
//!
//! A Rust REST API server tracking equipment maintenance records ("fichas"):
//! a spreadsheet-backed equipment table with a derived freshness status and
//! an append-only maintenance history per ficha.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod table;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
