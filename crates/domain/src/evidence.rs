use chrono::{DateTime, Utc};
use fieldtrack_core::{AppError, AppResult, UserId};
use serde::{Deserialize, Serialize};

use crate::{EvidenceId, ItemId, StageId};

/// Longest accepted textual coordinate.
pub const COORDINATE_MAX_LENGTH: usize = 32;

/// WGS84 position attached to a photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    latitude: f64,
    longitude: f64,
}

impl GpsCoordinates {
    /// Creates validated coordinates, rounded to six decimal places.
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::Validation(format!(
                "latitude {latitude} is out of range"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Validation(format!(
                "longitude {longitude} is out of range"
            )));
        }

        Ok(Self {
            latitude: round_micro_degrees(latitude),
            longitude: round_micro_degrees(longitude),
        })
    }

    /// Parses client-supplied coordinate strings.
    ///
    /// Both blank means "not supplied". Supplying only one of them, oversized
    /// strings and non-numeric values are validation errors.
    pub fn parse_optional(
        latitude: Option<&str>,
        longitude: Option<&str>,
    ) -> AppResult<Option<Self>> {
        let latitude = latitude.map(str::trim).filter(|value| !value.is_empty());
        let longitude = longitude.map(str::trim).filter(|value| !value.is_empty());

        match (latitude, longitude) {
            (None, None) => Ok(None),
            (Some(latitude), Some(longitude)) => Ok(Some(Self::new(
                parse_coordinate("latitude", latitude)?,
                parse_coordinate("longitude", longitude)?,
            )?)),
            _ => Err(AppError::Validation(
                "latitude and longitude must be supplied together".to_owned(),
            )),
        }
    }

    /// Returns the latitude in decimal degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in decimal degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn parse_coordinate(label: &str, value: &str) -> AppResult<f64> {
    if value.len() > COORDINATE_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "{label} must not exceed {COORDINATE_MAX_LENGTH} characters"
        )));
    }

    value
        .parse::<f64>()
        .map_err(|_| AppError::Validation(format!("{label} '{value}' is not a number")))
}

fn round_micro_degrees(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Photo proving one stage of work on one item.
///
/// At most one record exists per (item, stage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// Record identifier.
    pub id: EvidenceId,
    /// Evidenced item.
    pub item_id: ItemId,
    /// Evidenced stage.
    pub stage_id: StageId,
    /// Opaque media storage key of the (possibly branded) image.
    pub image_key: String,
    /// Capture position, when known.
    pub gps: Option<GpsCoordinates>,
    /// Capture timestamp.
    pub captured_at: DateTime<Utc>,
    /// Uploader.
    pub uploaded_by: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::GpsCoordinates;

    #[test]
    fn blank_coordinates_are_not_supplied() {
        let parsed = GpsCoordinates::parse_optional(Some(" "), None);
        assert!(matches!(parsed, Ok(None)));
    }

    #[test]
    fn oversized_coordinate_strings_are_rejected() {
        let oversized = "1".repeat(40);
        let parsed = GpsCoordinates::parse_optional(Some(oversized.as_str()), Some("7.5"));
        assert!(parsed.is_err());
    }

    #[test]
    fn half_supplied_coordinates_are_rejected() {
        assert!(GpsCoordinates::parse_optional(Some("12.0"), None).is_err());
    }

    #[test]
    fn coordinates_are_rounded_to_six_places() {
        let parsed = GpsCoordinates::parse_optional(Some("12.12345678"), Some("-8.5"))
            .unwrap_or_else(|_| unreachable!())
            .unwrap_or_else(|| unreachable!());
        assert!((parsed.latitude() - 12.123457).abs() < 1e-9);
        assert!((parsed.longitude() + 8.5).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_latitude_is_rejected() {
        assert!(GpsCoordinates::new(91.0, 0.0).is_err());
    }
}
