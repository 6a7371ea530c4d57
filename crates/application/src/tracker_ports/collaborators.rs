use std::collections::BTreeSet;

use async_trait::async_trait;
use fieldtrack_core::AppResult;
use fieldtrack_domain::GpsCoordinates;

/// Reads GPS coordinates from image metadata.
///
/// Implementations never fail: undecodable images yield `None`.
pub trait GeoTagger: Send + Sync {
    /// Extracts embedded coordinates, if any.
    fn extract(&self, image: &[u8]) -> Option<GpsCoordinates>;
}

/// Result of branding an evidence photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandingOutcome {
    /// Branding succeeded.
    Branded(Vec<u8>),
    /// Branding failed; the original bytes are returned unchanged.
    Unbranded {
        /// Image exactly as uploaded.
        original: Vec<u8>,
        /// Failure description for telemetry.
        reason: String,
    },
}

impl BrandingOutcome {
    /// Returns whether branding was applied.
    #[must_use]
    pub fn is_branded(&self) -> bool {
        matches!(self, Self::Branded(_))
    }

    /// Returns the image to persist.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Branded(bytes) => bytes,
            Self::Unbranded { original, .. } => original,
        }
    }
}

/// Overlays company branding and position text onto a photo.
#[async_trait]
pub trait Watermarker: Send + Sync {
    /// Brands an image, always returning a usable image.
    async fn brand(&self, image: Vec<u8>, gps: Option<GpsCoordinates>) -> BrandingOutcome;
}

/// Reads headers and column values from an uploaded CSV or XLSX file.
///
/// Both operations fail soft to empty collections.
pub trait SpreadsheetAdapter: Send + Sync {
    /// Returns the header row in file order.
    fn headers(&self, file: &[u8], filename: &str) -> Vec<String>;

    /// Returns distinct, trimmed, non-empty values of one column, sorted.
    fn column_values(&self, file: &[u8], filename: &str, column: &str) -> BTreeSet<String>;
}

/// Blob storage for evidence images and data files.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Stores bytes under a fresh key inside `namespace` and returns the key.
    async fn put(&self, namespace: &str, filename: &str, bytes: Vec<u8>) -> AppResult<String>;

    /// Loads the bytes stored under `key`.
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>>;

    /// Removes the bytes stored under `key`. Missing keys are ignored.
    async fn delete(&self, key: &str) -> AppResult<()>;
}
