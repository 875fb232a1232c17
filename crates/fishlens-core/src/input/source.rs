//! Image acquisition from files, raw bytes and data URIs.

use std::path::Path;

use base64::Engine;

use crate::error::{IdentifyError, IdentifyResult};

use super::validate::sniff_media_type;

/// Media type used when the bytes match no known image signature.
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Image data submitted for identification.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Raw encoded image bytes
    pub bytes: Vec<u8>,
    /// MIME type sniffed from the bytes (e.g. "image/jpeg")
    pub media_type: String,
    /// Human-readable origin used in logs and errors
    pub source: String,
}

impl ImageInput {
    /// Wrap raw bytes. The media type is sniffed from the leading bytes;
    /// nothing is rejected here (see [`super::Validator`]).
    pub fn from_bytes(bytes: Vec<u8>, source: impl Into<String>) -> Self {
        let media_type = sniff_media_type(&bytes)
            .unwrap_or(UNKNOWN_MEDIA_TYPE)
            .to_string();
        Self {
            bytes,
            media_type,
            source: source.into(),
        }
    }

    /// Read an image file from disk.
    ///
    /// Files larger than `max_bytes` are rejected from their metadata
    /// without being read.
    pub async fn read_path(path: &Path, max_bytes: u64) -> IdentifyResult<Self> {
        let source = path.display().to_string();
        if !path.is_file() {
            return Err(IdentifyError::invalid_input(source, "file not found"));
        }

        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            IdentifyError::invalid_input(&source, format!("cannot read metadata: {e}"))
        })?;
        if metadata.len() > max_bytes {
            return Err(IdentifyError::invalid_input(
                &source,
                format!(
                    "image too large ({}MB > {}MB)",
                    metadata.len() / (1024 * 1024),
                    max_bytes / (1024 * 1024)
                ),
            ));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IdentifyError::invalid_input(&source, format!("cannot read file: {e}")))?;
        Ok(Self::from_bytes(bytes, source))
    }

    /// Parse a `data:<media-type>;base64,<payload>` URI.
    ///
    /// The declared media type must be `image/*`; the payload must be valid
    /// base64. The stored media type is sniffed from the decoded bytes.
    pub fn from_data_uri(uri: &str) -> IdentifyResult<Self> {
        const SOURCE: &str = "data-uri";

        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| IdentifyError::invalid_input(SOURCE, "missing 'data:' prefix"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| IdentifyError::invalid_input(SOURCE, "missing ',' separator"))?;

        let mut params = header.split(';');
        let declared = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        if !declared.starts_with("image/") {
            return Err(IdentifyError::invalid_input(
                SOURCE,
                format!("declared media type '{declared}' is not an image"),
            ));
        }
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(IdentifyError::invalid_input(
                SOURCE,
                "only base64-encoded data URIs are supported",
            ));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| IdentifyError::invalid_input(SOURCE, format!("invalid base64: {e}")))?;

        Ok(Self::from_bytes(bytes, SOURCE))
    }

    /// Encode back into a base64 data URI.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
