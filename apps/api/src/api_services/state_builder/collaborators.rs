use std::sync::Arc;

use fieldtrack_application::{GeoTagger, MediaStore, PasswordHasher, SpreadsheetAdapter, Watermarker};
use fieldtrack_core::AppError;
use fieldtrack_infrastructure::{
    Argon2PasswordHasher, ExifGeoTagger, FilesystemMediaStore, ImageWatermarker,
    TabularSpreadsheetAdapter, WatermarkConfig,
};
use tracing::info;

use crate::api_config::ApiConfig;

/// Non-persistence adapters shared by the services.
pub struct Collaborators {
    pub media: Arc<dyn MediaStore>,
    pub spreadsheet: Arc<dyn SpreadsheetAdapter>,
    pub geotagger: Arc<dyn GeoTagger>,
    pub watermarker: Arc<dyn Watermarker>,
    pub password_hasher: Arc<dyn PasswordHasher>,
}

impl Collaborators {
    /// Builds the default adapters over a media directory.
    pub fn new(media_root: impl Into<std::path::PathBuf>, watermark: WatermarkConfig) -> Self {
        Self {
            media: Arc::new(FilesystemMediaStore::new(media_root)),
            spreadsheet: Arc::new(TabularSpreadsheetAdapter::new()),
            geotagger: Arc::new(ExifGeoTagger::new()),
            watermarker: Arc::new(ImageWatermarker::new(watermark)),
            password_hasher: Arc::new(Argon2PasswordHasher::new()),
        }
    }
}

pub(super) async fn build_collaborators(config: &ApiConfig) -> Result<Collaborators, AppError> {
    tokio::fs::create_dir_all(&config.media_root)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to create media root '{}': {error}",
                config.media_root.display()
            ))
        })?;

    let logo = match &config.watermark_logo_path {
        Some(path) => Some(tokio::fs::read(path).await.map_err(|error| {
            AppError::Validation(format!(
                "failed to read WATERMARK_LOGO_PATH '{}': {error}",
                path.display()
            ))
        })?),
        None => None,
    };
    info!(
        media_root = %config.media_root.display(),
        brand = %config.watermark_brand,
        has_logo = logo.is_some(),
        "evidence storage configured"
    );

    Ok(Collaborators::new(
        config.media_root.clone(),
        WatermarkConfig {
            brand: config.watermark_brand.clone(),
            logo,
        },
    ))
}
