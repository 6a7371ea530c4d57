//! Evidence photo branding.
//!
//! Draws a translucent black box in the bottom-right corner holding the
//! configured logo and three lines of text: the brand, the coordinates and
//! the capture time. Glyphs come from the `font8x8` bitmap set, scaled with
//! the photo height. The branded photo is always re-encoded as JPEG.

use std::io::Cursor;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fieldtrack_application::{BrandingOutcome, Watermarker};
use fieldtrack_domain::GpsCoordinates;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageDecoder, ImageReader, Rgba, RgbaImage};
use font8x8::legacy::BASIC_LEGACY;
use tracing::{debug, warn};

const PADDING: u32 = 30;
const BOX_ALPHA: u32 = 180;
const JPEG_QUALITY: u8 = 95;
const LOGO_HEIGHT_RATIO: f64 = 0.10;
const TITLE_HEIGHT_RATIO: f64 = 0.035;
const BODY_HEIGHT_RATIO: f64 = 0.025;
const LINE_GAP: u32 = 5;
const GLYPH_SIZE: u32 = 8;

/// One line of stamped text.
#[derive(Debug, Clone, PartialEq)]
struct StampLine {
    text: String,
    height_ratio: f64,
    color: [u8; 3],
}

/// Branding settings.
#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    /// Company name stamped above the coordinates.
    pub brand: String,
    /// Encoded logo image, usually PNG.
    pub logo: Option<Vec<u8>>,
}

/// Image-crate implementation of the watermarking port.
#[derive(Debug, Clone)]
pub struct ImageWatermarker {
    brand: String,
    logo: Option<RgbaImage>,
}

impl ImageWatermarker {
    /// Creates a watermarker. An undecodable logo is dropped with a warning.
    #[must_use]
    pub fn new(config: WatermarkConfig) -> Self {
        let logo = config.logo.and_then(|bytes| match image::load_from_memory(&bytes) {
            Ok(logo) => Some(logo.to_rgba8()),
            Err(error) => {
                warn!(brand = %config.brand, error = %error, "ignoring undecodable watermark logo");
                None
            }
        });

        Self {
            brand: config.brand,
            logo,
        }
    }
}

#[async_trait]
impl Watermarker for ImageWatermarker {
    async fn brand(&self, image: Vec<u8>, gps: Option<GpsCoordinates>) -> BrandingOutcome {
        let logo = self.logo.clone();
        let original = image.clone();
        let lines = stamp_lines(&self.brand, gps.as_ref(), Utc::now());
        let result = tokio::task::spawn_blocking(move || render(&image, logo.as_ref(), &lines))
            .await
            .map_err(|error| format!("branding task failed: {error}"))
            .and_then(|rendered| rendered);

        match result {
            Ok(branded) => {
                debug!(brand = %self.brand, has_gps = gps.is_some(), "evidence photo branded");
                BrandingOutcome::Branded(branded)
            }
            Err(reason) => {
                warn!(brand = %self.brand, reason = %reason, "storing evidence photo unbranded");
                BrandingOutcome::Unbranded { original, reason }
            }
        }
    }
}

fn stamp_lines(
    brand: &str,
    gps: Option<&GpsCoordinates>,
    captured_at: DateTime<Utc>,
) -> Vec<StampLine> {
    let position = match gps {
        Some(gps) => format!("Lat: {:.6}, Lon: {:.6}", gps.latitude(), gps.longitude()),
        None => "GPS Unavailable".to_owned(),
    };

    vec![
        StampLine {
            text: brand.to_owned(),
            height_ratio: TITLE_HEIGHT_RATIO,
            color: [255, 255, 255],
        },
        StampLine {
            text: position,
            height_ratio: BODY_HEIGHT_RATIO,
            color: [208, 208, 208],
        },
        StampLine {
            text: captured_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            height_ratio: BODY_HEIGHT_RATIO,
            color: [176, 176, 176],
        },
    ]
}

fn render(bytes: &[u8], logo: Option<&RgbaImage>, lines: &[StampLine]) -> Result<Vec<u8>, String> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|error| format!("failed to sniff image format: {error}"))?
        .into_decoder()
        .map_err(|error| format!("unsupported image: {error}"))?;
    let orientation = decoder
        .orientation()
        .map_err(|error| format!("failed to read orientation: {error}"))?;
    let mut photo = DynamicImage::from_decoder(decoder)
        .map_err(|error| format!("failed to decode image: {error}"))?;
    photo.apply_orientation(orientation);

    let mut canvas = photo.to_rgba8();
    let (width, height) = canvas.dimensions();

    let logo = logo.map(|logo| scaled_logo(logo, height));
    let (logo_width, logo_height) = logo.as_ref().map_or((0, 0), RgbaImage::dimensions);

    let scales = lines
        .iter()
        .map(|line| glyph_scale(height, line.height_ratio))
        .collect::<Vec<_>>();
    let text_width = lines
        .iter()
        .zip(&scales)
        .map(|(line, scale)| text_width(&line.text, *scale))
        .max()
        .unwrap_or(0);
    let text_height = scales.iter().map(|scale| GLYPH_SIZE * scale).sum::<u32>()
        + LINE_GAP * u32::try_from(lines.len().saturating_sub(1)).unwrap_or(0);

    let logo_gap = if logo.is_some() { PADDING } else { 0 };
    let box_width = logo_width + logo_gap + text_width + PADDING * 2;
    let box_height = logo_height.max(text_height) + PADDING * 2;
    let right = width.saturating_sub(PADDING);
    let bottom = height.saturating_sub(PADDING);
    let left = right.saturating_sub(box_width);
    let top = bottom.saturating_sub(box_height);

    darken(&mut canvas, left, top, right, bottom);

    let mut text_left = left + PADDING;
    if let Some(logo) = logo {
        let logo_top = top + (box_height.saturating_sub(logo_height)) / 2;
        imageops::overlay(&mut canvas, &logo, i64::from(text_left), i64::from(logo_top));
        text_left += logo_width + logo_gap;
    }

    let mut text_top = top + PADDING;
    for (line, scale) in lines.iter().zip(scales) {
        draw_text(&mut canvas, &line.text, text_left, text_top, scale, line.color);
        text_top += GLYPH_SIZE * scale + LINE_GAP;
    }

    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|error| format!("failed to encode branded image: {error}"))?;

    Ok(encoded)
}

fn scaled(length: u32, ratio: f64) -> u32 {
    // Truncation to whole pixels.
    (f64::from(length) * ratio) as u32
}

fn scaled_logo(logo: &RgbaImage, photo_height: u32) -> RgbaImage {
    let side = scaled(photo_height, LOGO_HEIGHT_RATIO).max(1);
    let (width, height) = logo.dimensions();
    if width <= side && height <= side {
        return logo.clone();
    }

    DynamicImage::ImageRgba8(logo.clone())
        .resize(side, side, FilterType::Triangle)
        .to_rgba8()
}

fn glyph_scale(photo_height: u32, ratio: f64) -> u32 {
    (scaled(photo_height, ratio) / GLYPH_SIZE).max(1)
}

fn text_width(text: &str, scale: u32) -> u32 {
    u32::try_from(text.chars().count())
        .unwrap_or(u32::MAX)
        .saturating_mul(GLYPH_SIZE * scale)
}

fn draw_text(canvas: &mut RgbaImage, text: &str, left: u32, top: u32, scale: u32, color: [u8; 3]) {
    let (width, height) = canvas.dimensions();
    let [red, green, blue] = color;

    for (index, character) in (0_u32..).zip(text.chars()) {
        // Non-ASCII characters render as '?'.
        let glyph = BASIC_LEGACY
            .get(character as usize)
            .copied()
            .unwrap_or(BASIC_LEGACY[usize::from(b'?')]);
        let glyph_left = left + index * GLYPH_SIZE * scale;

        for (row, bits) in (0_u32..).zip(glyph) {
            for column in 0..GLYPH_SIZE {
                if (bits >> column) & 1 == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = glyph_left + column * scale + dx;
                        let y = top + row * scale + dy;
                        if x < width && y < height {
                            canvas.put_pixel(x, y, Rgba([red, green, blue, 255]));
                        }
                    }
                }
            }
        }
    }
}

fn darken(canvas: &mut RgbaImage, left: u32, top: u32, right: u32, bottom: u32) {
    for y in top..bottom {
        for x in left..right {
            let Rgba([red, green, blue, alpha]) = *canvas.get_pixel(x, y);
            let shade = |channel: u8| {
                u8::try_from(u32::from(channel) * (255 - BOX_ALPHA) / 255).unwrap_or(u8::MAX)
            };
            canvas.put_pixel(x, y, Rgba([shade(red), shade(green), shade(blue), alpha]));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::{TimeZone, Utc};
    use fieldtrack_application::{BrandingOutcome, Watermarker};
    use fieldtrack_domain::GpsCoordinates;
    use image::{ImageFormat, Rgba, RgbaImage};

    use super::{ImageWatermarker, WatermarkConfig, render, stamp_lines};

    fn encoded(width: u32, height: u32, color: [u8; 4], format: ImageFormat) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        RgbaImage::from_pixel(width, height, Rgba(color))
            .write_to(&mut bytes, format)
            .unwrap_or_else(|_| unreachable!());
        bytes.into_inner()
    }

    fn watermarker(logo: Option<Vec<u8>>) -> ImageWatermarker {
        ImageWatermarker::new(WatermarkConfig {
            brand: "Fieldtrack".to_owned(),
            logo,
        })
    }

    fn kano() -> GpsCoordinates {
        GpsCoordinates::new(12.002179, 8.591956).unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn branded_photo_is_a_jpeg_with_a_dark_corner() {
        let photo = encoded(400, 300, [250, 250, 250, 255], ImageFormat::Png);
        let logo = encoded(200, 200, [255, 0, 0, 255], ImageFormat::Png);

        let outcome = watermarker(Some(logo)).brand(photo, None).await;
        assert!(outcome.is_branded());

        let bytes = outcome.into_bytes();
        assert_eq!(
            image::guess_format(&bytes).ok(),
            Some(ImageFormat::Jpeg)
        );

        let branded = image::load_from_memory(&bytes)
            .unwrap_or_else(|_| unreachable!())
            .to_rgb8();
        assert_eq!(branded.dimensions(), (400, 300));

        let untouched = branded.get_pixel(5, 5);
        let box_padding = branded.get_pixel(70, 180);
        assert!(untouched[0] > 200);
        assert!(box_padding[1] < 120);
    }

    #[test]
    fn stamp_carries_brand_coordinates_and_capture_time() {
        let captured_at = Utc
            .with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
            .single()
            .unwrap_or_else(|| unreachable!());

        let located = stamp_lines("Nexsafe", Some(&kano()), captured_at)
            .into_iter()
            .map(|line| line.text)
            .collect::<Vec<_>>();
        let unlocated = stamp_lines("Nexsafe", None, captured_at)
            .into_iter()
            .map(|line| line.text)
            .collect::<Vec<_>>();

        assert_eq!(
            located,
            vec![
                "Nexsafe".to_owned(),
                "Lat: 12.002179, Lon: 8.591956".to_owned(),
                "2026-03-14 09:26:53 UTC".to_owned(),
            ]
        );
        assert_eq!(unlocated[1], "GPS Unavailable");
    }

    #[test]
    fn coordinates_change_the_stamped_pixels() {
        let photo = encoded(640, 480, [40, 90, 40, 255], ImageFormat::Png);
        let captured_at = Utc
            .with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
            .single()
            .unwrap_or_else(|| unreachable!());

        let decode = |bytes: Vec<u8>| {
            image::load_from_memory(&bytes)
                .unwrap_or_else(|_| unreachable!())
                .to_rgb8()
        };
        let with_gps = render(&photo, None, &stamp_lines("Fieldtrack", Some(&kano()), captured_at))
            .map(decode)
            .unwrap_or_else(|_| unreachable!());
        let without_gps = render(&photo, None, &stamp_lines("Fieldtrack", None, captured_at))
            .map(decode)
            .unwrap_or_else(|_| unreachable!());
        let repeated = render(&photo, None, &stamp_lines("Fieldtrack", Some(&kano()), captured_at))
            .map(decode)
            .unwrap_or_else(|_| unreachable!());

        assert_ne!(with_gps, without_gps);
        assert_eq!(with_gps, repeated);
        assert!(with_gps.pixels().any(|pixel| pixel[0] > 200 && pixel[1] > 200));
    }

    #[tokio::test]
    async fn undecodable_upload_is_returned_unchanged() {
        let outcome = watermarker(None).brand(b"not an image".to_vec(), None).await;

        assert!(matches!(
            outcome,
            BrandingOutcome::Unbranded { ref original, .. } if original == b"not an image"
        ));
    }

    #[test]
    fn broken_logo_is_ignored() {
        let watermarker = watermarker(Some(b"broken".to_vec()));
        assert!(watermarker.logo.is_none());
    }
}
