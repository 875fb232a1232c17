//! Image decoding with format detection, dimension limits and timeout.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::DecodeError;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory image on the blocking pool, bounded by
    /// `limits.decode_timeout_ms`.
    pub async fn decode(&self, bytes: Vec<u8>) -> Result<DecodedImage, DecodeError> {
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_sync(bytes)).await
        })
        .await;

        let decoded = match decode_result {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => return Err(DecodeError::Malformed(format!("Task join error: {e}"))),
            Err(_) => return Err(DecodeError::Timeout(self.limits.decode_timeout_ms)),
        };

        let max_dim = self.limits.max_image_dimension;
        if decoded.width > max_dim || decoded.height > max_dim {
            return Err(DecodeError::TooLarge {
                width: decoded.width,
                height: decoded.height,
                max_dim,
            });
        }
        Ok(decoded)
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    pub(crate) fn decode_sync(bytes: Vec<u8>) -> Result<DecodedImage, DecodeError> {
        use std::io::Cursor;

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError::Malformed(format!("Cannot detect image format: {e}")))?;
        let format = reader
            .format()
            .ok_or_else(|| DecodeError::Malformed("Unsupported image format".to_string()))?;
        let image = reader
            .decode()
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}
