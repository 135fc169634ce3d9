//! Image preparation for the classification request.
//!
//! Wound photos arrive straight from phone cameras: multi-megabyte, rotated
//! through EXIF, in whatever format the browser or OS produced. The classifier
//! only needs a modest, upright JPEG, so every upload is:
//!
//! 1. decoded from base64 (data-URI header optional)
//! 2. decoded as an image
//! 3. rotated per EXIF orientation
//! 4. shrunk so the longer edge is at most 512 px (never upscaled)
//! 5. re-encoded as JPEG at quality 75
//!
//! If step 1 or 2 fails, the original bytes are passed through untouched with
//! the best MIME guess available so the request can still be attempted.

use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat, RgbImage};
use regex::Regex;
use tracing::{debug, warn};

use super::AssessmentError;
use crate::models::ImagePayload;

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Longest edge of the transmitted image.
pub const DEFAULT_MAX_EDGE: u32 = 512;

/// JPEG quality (0-100) for the re-encoded payload.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// MIME type assumed when nothing better is known.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Maximum decoded upload size before rejecting.
/// Prevents OOM on corrupt/adversarial files.
const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024; // 20 MB

static DATA_URL_MIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:([^;,]+)").unwrap());

// ═══════════════════════════════════════════════════════════
// SourceImage
// ═══════════════════════════════════════════════════════════

/// An uploaded image before preprocessing: base64 text plus an optional
/// MIME hint taken from a data-URI header, a file extension, or the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    encoded: String,
    mime_hint: Option<String>,
}

impl SourceImage {
    /// Parse a `data:<mime>;base64,<data>` URL as produced by browser file
    /// readers. Input without a comma is treated as bare base64.
    pub fn from_data_url(data_url: &str) -> Self {
        match data_url.split_once(',') {
            Some((header, data)) => Self {
                encoded: data.to_string(),
                mime_hint: DATA_URL_MIME
                    .captures(header.trim())
                    .map(|c| c[1].trim().to_string()),
            },
            None => Self {
                encoded: data_url.to_string(),
                mime_hint: None,
            },
        }
    }

    pub fn from_base64(encoded: impl Into<String>, mime_hint: Option<&str>) -> Self {
        Self {
            encoded: encoded.into(),
            mime_hint: mime_hint.map(str::to_string),
        }
    }

    pub fn from_bytes(bytes: &[u8], mime_hint: Option<&str>) -> Self {
        Self::from_base64(
            base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_hint,
        )
    }

    /// Read an image file; the MIME hint is guessed from its extension.
    pub fn from_path(path: &Path) -> Result<Self, AssessmentError> {
        let bytes = std::fs::read(path).map_err(|e| {
            AssessmentError::ImageProcessing(format!("Cannot read {}: {e}", path.display()))
        })?;
        let mime = mime_guess::from_path(path)
            .first()
            .filter(|m| m.type_() == mime_guess::mime::IMAGE)
            .map(|m| m.essence_str().to_string());
        Ok(Self::from_bytes(&bytes, mime.as_deref()))
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn mime_hint(&self) -> Option<&str> {
        self.mime_hint.as_deref()
    }

    /// Payload sent when the image cannot be decoded locally.
    fn pass_through(&self) -> ImagePayload {
        ImagePayload {
            mime_type: self
                .mime_hint
                .clone()
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            encoded_data: self.encoded.trim().to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// ImagePreprocessor trait (orchestrator interface)
// ═══════════════════════════════════════════════════════════

/// Prepares an uploaded image for the classification request.
///
/// Pure transform: no network, no filesystem. Decode failures are not
/// errors (see module docs); only unusable input is.
pub trait ImagePreprocessor: Send + Sync {
    fn prepare(&self, source: &SourceImage) -> Result<ImagePayload, AssessmentError>;
}

/// Production preprocessor: orient, bound, re-encode as JPEG.
#[derive(Debug, Clone)]
pub struct JpegPreprocessor {
    max_edge: u32,
    quality: u8,
    max_input_bytes: usize,
}

impl Default for JpegPreprocessor {
    fn default() -> Self {
        Self {
            max_edge: DEFAULT_MAX_EDGE,
            quality: DEFAULT_JPEG_QUALITY,
            max_input_bytes: MAX_IMAGE_BYTES,
        }
    }
}

impl JpegPreprocessor {
    pub fn new(max_edge: u32, quality: u8) -> Self {
        Self {
            max_edge: max_edge.max(1),
            quality: quality.clamp(1, 100),
            ..Self::default()
        }
    }

    pub fn with_max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = limit;
        self
    }
}

impl ImagePreprocessor for JpegPreprocessor {
    fn prepare(&self, source: &SourceImage) -> Result<ImagePayload, AssessmentError> {
        let encoded = source.encoded().trim();
        if encoded.is_empty() {
            return Err(AssessmentError::ImageProcessing("Image data is empty".into()));
        }

        // Cheap bound before allocating the decoded buffer.
        let estimated = encoded.len() / 4 * 3;
        if estimated > self.max_input_bytes.saturating_add(3) {
            return Err(too_large(self.max_input_bytes));
        }

        let bytes = match decode_base64(encoded) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Image payload is not valid base64, sending original");
                return Ok(source.pass_through());
            }
        };
        if bytes.len() > self.max_input_bytes {
            return Err(too_large(self.max_input_bytes));
        }

        let img = match image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!(
                    error = %e,
                    mime_hint = ?source.mime_hint(),
                    "Image decode failed, sending original bytes"
                );
                return Ok(source.pass_through());
            }
        };

        let img = apply_orientation(img, read_exif_orientation(&bytes));
        let (orig_w, orig_h) = img.dimensions();
        let (w, h) = compute_fit_dimensions(orig_w, orig_h, self.max_edge);

        let rgb = img.to_rgb8();
        let rgb = if (w, h) == (orig_w, orig_h) {
            rgb
        } else {
            image::imageops::resize(&rgb, w, h, FilterType::CatmullRom)
        };

        let jpeg = encode_jpeg(&rgb, self.quality)?;

        debug!(
            original = format!("{orig_w}x{orig_h}"),
            output = format!("{w}x{h}"),
            input_bytes = bytes.len(),
            jpeg_bytes = jpeg.len(),
            "Image prepared for classification"
        );

        Ok(ImagePayload {
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            encoded_data: base64::engine::general_purpose::STANDARD.encode(jpeg),
        })
    }
}

fn too_large(limit: usize) -> AssessmentError {
    AssessmentError::ImageProcessing(format!(
        "Image data exceeds {}MB limit",
        limit / (1024 * 1024)
    ))
}

// ═══════════════════════════════════════════════════════════
// Pure helper functions (reusable)
// ═══════════════════════════════════════════════════════════

/// Decode standard base64, ignoring embedded whitespace and line breaks.
fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD.decode(compact)
}

/// Read EXIF orientation tag from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply EXIF orientation transform to a `DynamicImage`.
///
/// 1 = Normal, 2 = Mirrored, 3 = 180deg, 4 = Flipped V,
/// 5 = Mirrored + 90deg CW, 6 = 90deg CW, 7 = Mirrored + 270deg CW, 8 = 270deg CW
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Scale so the longer edge is at most `max_edge`, preserving aspect ratio.
/// Images already within bounds are returned unchanged (no upscaling).
pub fn compute_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width.max(1), height.max(1));
    }

    let scale_edge = |short: u32, long: u32| -> u32 {
        ((short as f64 * max_edge as f64 / long as f64).round() as u32).max(1)
    };

    if width > height {
        if width > max_edge {
            return (max_edge, scale_edge(height, width));
        }
    } else if height > max_edge {
        return (scale_edge(width, height), max_edge);
    }
    (width, height)
}

/// Encode an RGB image as JPEG bytes at the given quality.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, AssessmentError> {
    let dynamic = DynamicImage::ImageRgb8(img.clone());
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Jpeg(quality))
        .map_err(|e| AssessmentError::ImageProcessing(format!("JPEG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}
