//! Business logic services

pub mod fichas;
pub mod settings;

use crate::{config::AppConfig, error::AppResult, store::Store};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub fichas: fichas::FichasService,
    pub settings: settings::SettingsService,
}

impl Services {
    /// Create all services with the given record store
    pub fn new(store: Store, config: &AppConfig) -> AppResult<Self> {
        let settings = settings::SettingsService::new(config.maintenance.threshold_days)?;
        Ok(Self {
            fichas: fichas::FichasService::new(store, settings.clone(), &config.maintenance),
            settings,
        })
    }
}
