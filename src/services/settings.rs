//! Settings service: the operator-configurable freshness threshold

use std::sync::Arc;

use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    api::settings::{SettingsResponse, UpdateSettingsRequest},
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct SettingsService {
    threshold_days: Arc<RwLock<u32>>,
}

impl SettingsService {
    /// The threshold is validated at this boundary; the status engine
    /// itself takes whatever it is handed.
    pub fn new(threshold_days: u32) -> AppResult<Self> {
        if !(1..=365).contains(&threshold_days) {
            return Err(AppError::Validation(format!(
                "threshold_days must be within 1..=365, got {}",
                threshold_days
            )));
        }
        Ok(Self {
            threshold_days: Arc::new(RwLock::new(threshold_days)),
        })
    }

    pub async fn threshold_days(&self) -> u32 {
        *self.threshold_days.read().await
    }

    /// Get current settings
    pub async fn get_settings(&self) -> SettingsResponse {
        SettingsResponse {
            threshold_days: self.threshold_days().await,
        }
    }

    /// Update settings. The new threshold applies to every row on the next
    /// evaluation pass; there are no per-row overrides.
    pub async fn update_settings(&self, request: UpdateSettingsRequest) -> AppResult<SettingsResponse> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        *self.threshold_days.write().await = request.threshold_days;
        Ok(self.get_settings().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_threshold_is_range_checked() {
        assert!(SettingsService::new(0).is_err());
        assert!(SettingsService::new(366).is_err());
        assert!(SettingsService::new(1).is_ok());
        assert!(SettingsService::new(365).is_ok());
    }

    #[tokio::test]
    async fn test_update_applies_and_validates() {
        let service = SettingsService::new(90).unwrap();

        let updated = service
            .update_settings(UpdateSettingsRequest { threshold_days: 120 })
            .await
            .unwrap();
        assert_eq!(updated.threshold_days, 120);
        assert_eq!(service.threshold_days().await, 120);

        let err = service
            .update_settings(UpdateSettingsRequest { threshold_days: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(service.threshold_days().await, 120);
    }
}
