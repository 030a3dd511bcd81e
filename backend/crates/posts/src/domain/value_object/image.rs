//! Post Image Value Object
//!
//! Inline image bytes with magic-number sniffing (PNG or JPEG only) and
//! the 5 MiB size cap. The sniff runs before the size check so an
//! unsupported format reports INVALID_IMAGE even when oversized.

use kernel::error::app_error::{AppError, AppResult};

/// Maximum image payload: 5 MiB, inclusive
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub const fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Sniff the leading bytes for a supported format
pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.len() >= PNG_MAGIC.len() && bytes[..PNG_MAGIC.len()] == PNG_MAGIC {
        return Some(ImageFormat::Png);
    }
    if bytes.len() >= JPEG_MAGIC.len() && bytes[..JPEG_MAGIC.len()] == JPEG_MAGIC {
        return Some(ImageFormat::Jpeg);
    }
    None
}

/// Validated post image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostImage {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl PostImage {
    pub fn new(bytes: Vec<u8>) -> AppResult<Self> {
        let format = sniff(&bytes)
            .ok_or_else(|| AppError::invalid_image("Image must be PNG or JPEG format"))?;

        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::image_too_large(format!(
                "Image exceeds the {} byte limit",
                MAX_IMAGE_BYTES
            )));
        }

        Ok(Self { bytes, format })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
