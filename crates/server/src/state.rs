//! Application state shared across handlers.

use crate::device_api::DeviceApi;
use hangar_core::config::AppConfig;
use hangar_storage::ObjectStore;
use std::sync::Arc;

/// Shared application state.
///
/// Everything here is immutable after startup; requests share nothing
/// mutable with each other.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Object storage backend holding built images.
    pub storage: Arc<dyn ObjectStore>,
    /// Device-management API client.
    pub devices: Arc<dyn DeviceApi>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        devices: Arc<dyn DeviceApi>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            devices,
        }
    }
}
