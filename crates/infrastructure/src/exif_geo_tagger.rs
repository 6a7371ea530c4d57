//! GPS extraction from EXIF metadata.

use std::io::Cursor;

use exif::{Exif, In, Reader, Tag, Value};
use fieldtrack_application::GeoTagger;
use fieldtrack_domain::GpsCoordinates;

/// Reads the GPS position embedded in JPEG, TIFF, PNG, WebP or HEIF images.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifGeoTagger;

impl ExifGeoTagger {
    /// Creates a geotagger.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl GeoTagger for ExifGeoTagger {
    fn extract(&self, image: &[u8]) -> Option<GpsCoordinates> {
        let exif = Reader::new()
            .read_from_container(&mut Cursor::new(image))
            .ok()?;

        let latitude = signed_degrees(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, "N")?;
        let longitude = signed_degrees(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, "E")?;

        GpsCoordinates::new(latitude, longitude).ok()
    }
}

/// Converts a degrees/minutes/seconds triple into decimal degrees.
///
/// Any hemisphere other than `positive_ref` yields a negative value.
fn signed_degrees(exif: &Exif, value_tag: Tag, ref_tag: Tag, positive_ref: &str) -> Option<f64> {
    let Value::Rational(ref parts) = exif.get_field(value_tag, In::PRIMARY)?.value else {
        return None;
    };
    let [degrees, minutes, seconds] = parts.as_slice() else {
        return None;
    };
    if [degrees, minutes, seconds]
        .iter()
        .any(|part| part.denom == 0)
    {
        return None;
    }

    let Value::Ascii(ref hemisphere) = exif.get_field(ref_tag, In::PRIMARY)?.value else {
        return None;
    };
    let hemisphere = hemisphere.first().and_then(|raw| std::str::from_utf8(raw).ok())?;
    if hemisphere.trim().is_empty() {
        return None;
    }

    let magnitude = degrees.to_f64() + minutes.to_f64() / 60.0 + seconds.to_f64() / 3600.0;
    Some(if hemisphere.trim() == positive_ref {
        magnitude
    } else {
        -magnitude
    })
}
