//! Input validation before classification.
//!
//! Rejects anything that is not plausibly an image so the classifier is never
//! invoked on it.

use crate::config::LimitsConfig;
use crate::error::{IdentifyError, IdentifyResult};

use super::source::ImageInput;

/// Validates submitted images before they reach a classifier.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation.
    ///
    /// Checks:
    /// - Input is not empty
    /// - Size is within limits
    /// - Leading bytes match a known image signature
    pub fn validate(&self, input: &ImageInput) -> IdentifyResult<()> {
        if input.is_empty() {
            return Err(IdentifyError::invalid_input(&input.source, "no image data"));
        }

        if input.len() as u64 > self.limits.max_file_bytes() {
            return Err(IdentifyError::invalid_input(
                &input.source,
                format!(
                    "image too large ({}MB > {}MB)",
                    input.len() as u64 / (1024 * 1024),
                    self.limits.max_file_size_mb
                ),
            ));
        }

        if sniff_media_type(&input.bytes).is_none() {
            return Err(IdentifyError::invalid_input(
                &input.source,
                "unrecognized image format (invalid magic bytes)",
            ));
        }

        Ok(())
    }
}

/// Map leading bytes to an image MIME type.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    let mut header = [0u8; 12];
    let bytes_read = bytes.len().min(header.len());
    header[..bytes_read].copy_from_slice(&bytes[..bytes_read]);

    if bytes_read < 4 {
        return None;
    }

    // JPEG: FF D8 FF
    if header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
        return Some("image/jpeg");
    }

    // PNG: 89 50 4E 47
    if header[0] == 0x89 && header[1] == b'P' && header[2] == b'N' && header[3] == b'G' {
        return Some("image/png");
    }

    // GIF: GIF8
    if &header[..4] == b"GIF8" {
        return Some("image/gif");
    }

    // WebP: RIFF....WEBP
    if &header[..4] == b"RIFF" {
        if bytes_read >= 12 && &header[8..12] == b"WEBP" {
            return Some("image/webp");
        }
        return None;
    }

    // BMP: BM
    if header[0] == b'B' && header[1] == b'M' {
        return Some("image/bmp");
    }

    // TIFF: II (little-endian) or MM (big-endian) followed by version 42
    let is_tiff_le =
        header[0] == b'I' && header[1] == b'I' && header[2] == 0x2A && header[3] == 0x00;
    let is_tiff_be =
        header[0] == b'M' && header[1] == b'M' && header[2] == 0x00 && header[3] == 0x2A;
    if is_tiff_le || is_tiff_be {
        return Some("image/tiff");
    }

    // HEIC/HEIF/AVIF: ftyp box at offset 4, brand at offset 8.
    // Other ISO-BMFF brands (mp4, mov, ...) are video.
    if bytes_read >= 12 && &header[4..8] == b"ftyp" {
        return match &header[8..12] {
            b"avif" | b"avis" => Some("image/avif"),
            b"heic" | b"heix" | b"hevc" | b"hevx" | b"heim" | b"heis" | b"mif1" | b"msf1" => {
                Some("image/heic")
            }
            _ => None,
        };
    }

    None
}
