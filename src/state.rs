use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Database;
use crate::services::photo_storage::{CloudinaryStorage, DisabledStorage, PhotoStorage, StorageError};

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub photos: Arc<dyn PhotoStorage>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig, photos: Arc<dyn PhotoStorage>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            photos,
        }
    }

    /// Cloudinary when credentials are present, otherwise uploads answer 503
    pub fn with_configured_storage(db: Database, config: AppConfig) -> Result<Self, StorageError> {
        let photos: Arc<dyn PhotoStorage> = match CloudinaryStorage::from_config(&config.storage)? {
            Some(cloudinary) => Arc::new(cloudinary),
            None => {
                tracing::warn!("Cloudinary credentials not set, photo uploads are disabled");
                Arc::new(DisabledStorage)
            }
        };
        Ok(Self::new(db, config, photos))
    }
}
