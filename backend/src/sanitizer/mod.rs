//! Image sanitization
//!
//! Turns an untrusted upload into a publishable WebP: decode, rotate upright
//! according to EXIF orientation, force RGB/RGBA pixels, optionally shrink,
//! re-encode. Encoding from decoded pixels means no source metadata (GPS,
//! camera serials, embedded thumbnails) reaches the output.

pub mod orientation;

use image::{imageops::FilterType, DynamicImage, RgbImage, RgbaImage};
use thiserror::Error;

use orientation::Upright;

/// Content type of every sanitized output
pub const OUTPUT_CONTENT_TYPE: &str = "image/webp";

/// File extension of every sanitized output
pub const OUTPUT_EXTENSION: &str = "webp";

/// Largest width or height libwebp can encode
const MAX_WEBP_DIMENSION: u32 = 16_383;

/// Errors produced while sanitizing an image
#[derive(Debug, Error)]
pub enum SanitizeError {
    /// The payload is not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The decoded pixels could not be encoded as WebP
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Output size bound and lossy quality for one sanitize pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeProfile {
    /// Longest allowed side in pixels, `None` keeps the source size
    pub max_side: Option<u32>,
    /// WebP quality, 0-100
    pub quality: f32,
}

impl EncodeProfile {
    /// Full-size published image
    pub const ORIGINAL: Self = Self {
        max_side: None,
        quality: 82.0,
    };

    /// Thumbnail bounded to 640 px on its longest side
    pub const THUMBNAIL: Self = Self {
        max_side: Some(640),
        quality: 78.0,
    };
}

/// Encoded output together with its pixel dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedImage {
    /// WebP bytes
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Decodes `raw`, normalizes it and re-encodes it according to `profile`
///
/// # Errors
///
/// Returns `SanitizeError::Decode` when `raw` is not an image in a supported
/// format, `SanitizeError::Encode` when the result exceeds WebP limits.
pub fn sanitize(raw: &[u8], profile: EncodeProfile) -> Result<SanitizedImage, SanitizeError> {
    let decoded = image::load_from_memory(raw)?;

    let upright = Upright::read(raw).unwrap_or(Upright::IDENTITY).apply(decoded);

    let mut pixels = Pixels::from(upright);
    if let Some(max_side) = profile.max_side {
        let (width, height) = pixels.dimensions();
        let target = fit_within(width, height, max_side);
        if target != (width, height) {
            pixels = pixels.resized(target.0, target.1);
        }
    }

    let (width, height) = pixels.dimensions();
    let data = pixels.encode_webp(profile.quality)?;

    Ok(SanitizedImage {
        data,
        width,
        height,
    })
}

/// Dimensions scaled so the longest side is at most `max_side`
///
/// Aspect ratio is preserved and images already within bounds are returned
/// unchanged; no side is ever scaled up or rounded down to zero.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let max_side = max_side.max(1);
    let longest = width.max(height);
    if longest <= max_side {
        return (width, height);
    }

    let scale = f64::from(max_side) / f64::from(longest);
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max_side);

    (scaled(width), scaled(height))
}

/// Decoded pixels restricted to the two modes the encoder accepts
enum Pixels {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl From<DynamicImage> for Pixels {
    fn from(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageRgb8(rgb) => Self::Rgb(rgb),
            DynamicImage::ImageRgba8(rgba) => Self::Rgba(rgba),
            // Deeper RGBA is still RGBA, only narrowed to 8 bits
            DynamicImage::ImageRgba16(_) | DynamicImage::ImageRgba32F(_) => {
                Self::Rgba(img.to_rgba8())
            }
            // Luma, luma+alpha and deep RGB all become plain RGB
            other => Self::Rgb(other.to_rgb8()),
        }
    }
}

impl Pixels {
    fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Rgb(rgb) => rgb.dimensions(),
            Self::Rgba(rgba) => rgba.dimensions(),
        }
    }

    fn resized(self, width: u32, height: u32) -> Self {
        match self {
            Self::Rgb(rgb) => Self::Rgb(image::imageops::resize(
                &rgb,
                width,
                height,
                FilterType::Lanczos3,
            )),
            Self::Rgba(rgba) => Self::Rgba(image::imageops::resize(
                &rgba,
                width,
                height,
                FilterType::Lanczos3,
            )),
        }
    }

    fn encode_webp(&self, quality: f32) -> Result<Vec<u8>, SanitizeError> {
        let (width, height) = self.dimensions();
        if width > MAX_WEBP_DIMENSION || height > MAX_WEBP_DIMENSION {
            return Err(SanitizeError::Encode(format!(
                "{width}x{height} exceeds the WebP limit of {MAX_WEBP_DIMENSION} px per side"
            )));
        }

        let encoder = match self {
            Self::Rgb(rgb) => webp::Encoder::from_rgb(rgb.as_raw(), width, height),
            Self::Rgba(rgba) => webp::Encoder::from_rgba(rgba.as_raw(), width, height),
        };

        let memory = encoder
            .encode_simple(false, quality)
            .map_err(|e| SanitizeError::Encode(format!("{e:?}")))?;

        Ok(memory.to_vec())
    }
}
