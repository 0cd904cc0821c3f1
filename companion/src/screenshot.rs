//! Decoding of untrusted screenshot payloads.

use std::io::Cursor;

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use lingproc::ImageData;
use tracing::debug;

/// Smallest pixel count handed to the vision-language model.
pub const MIN_PIXELS: u64 = 256 * 28 * 28;
/// Largest pixel count handed to the vision-language model.
pub const MAX_PIXELS: u64 = 1024 * 28 * 28;

/// Validated RGB raster.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    rgb: RgbImage,
}

impl DecodedImage {
    pub fn new(rgb: RgbImage) -> Self {
        Self { rgb }
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.rgb
    }

    /// Encode as PNG for a vision-language model, resized to fit
    /// [`MIN_PIXELS`]..=[`MAX_PIXELS`].
    pub fn to_image_data(&self) -> Result<ImageData> {
        let (width, height) = clamp_dimensions(self.width(), self.height());
        let rgb = if (width, height) == (self.width(), self.height()) {
            self.rgb.clone()
        } else {
            debug!(
                from = ?(self.width(), self.height()),
                to = ?(width, height),
                "resizing image"
            );
            image::imageops::resize(&self.rgb, width, height, FilterType::Triangle)
        };
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb).write_to(&mut buf, ImageOutputFormat::Png)?;
        Ok(ImageData {
            mime: "image/png".into(),
            base64: BASE64.encode(buf.into_inner()),
        })
    }
}

/// Scale `width` x `height` so the pixel count lies within the model's
/// budget, preserving aspect ratio.
pub fn clamp_dimensions(width: u32, height: u32) -> (u32, u32) {
    let pixels = width as u64 * height as u64;
    if pixels == 0 || (MIN_PIXELS..=MAX_PIXELS).contains(&pixels) {
        return (width, height);
    }
    let target = if pixels > MAX_PIXELS { MAX_PIXELS } else { MIN_PIXELS };
    let scale = (target as f64 / pixels as f64).sqrt();
    let round = |v: f64| {
        if pixels > MAX_PIXELS { v.floor() } else { v.ceil() }
    };
    let w = round(width as f64 * scale).max(1.0) as u32;
    let h = round(height as f64 * scale).max(1.0) as u32;
    (w, h)
}

/// Remove a `data:<mime>;base64,` prefix if present.
fn strip_data_url(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => raw,
    }
}

/// Decode a base64 image payload.
///
/// Empty input returns `None` without attempting to decode. Malformed base64
/// and unreadable image bytes also return `None`; this never fails.
pub fn decode(raw: &str) -> Option<DecodedImage> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    // Line-wrapped payloads are accepted.
    let payload: String = strip_data_url(raw)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = match BASE64.decode(payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "image payload is not base64");
            return None;
        }
    };
    match image::load_from_memory(&bytes) {
        Ok(img) => Some(DecodedImage::new(img.to_rgb8())),
        Err(e) => {
            debug!(error = %e, "image payload is not a readable image");
            None
        }
    }
}
