//! Error types for the FishLens identification pipeline.
//!
//! Identification can only fail in two ways: the input is not an image, or
//! the classifier could not be initialized or invoked. The interpreter itself
//! is total and has no error type.

use thiserror::Error;

/// Top-level error type for FishLens operations.
#[derive(Error, Debug)]
pub enum FishLensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Identification errors
    #[error("Identification error: {0}")]
    Identify(#[from] IdentifyError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors surfaced to the user for a single identification request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifyError {
    /// Submitted data is not an acceptable image. Raised before the
    /// classifier is invoked.
    #[error("Invalid input from {source_name}: {message}")]
    InvalidInput {
        source_name: String,
        message: String,
    },

    /// The classifier could not be initialized or invoked.
    #[error("Classifier '{backend}' unavailable: {message}")]
    ClassificationUnavailable { backend: String, message: String },
}

impl IdentifyError {
    pub fn invalid_input(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ClassificationUnavailable {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Whether the user may retry the same request.
    ///
    /// Nothing is retried automatically; this only drives the wording of the
    /// notification.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ClassificationUnavailable { .. })
    }
}

/// Image decoding failures inside a classifier backend.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Bytes could not be decoded as an image
    #[error("Cannot decode image: {0}")]
    Malformed(String),

    /// Image dimensions exceed limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    TooLarge { width: u32, height: u32, max_dim: u32 },

    /// Decoding took too long
    #[error("Decode timed out after {0}ms")]
    Timeout(u64),
}

/// Convenience type alias for FishLens results.
pub type Result<T> = std::result::Result<T, FishLensError>;

/// Convenience type alias for identification results.
pub type IdentifyResult<T> = std::result::Result<T, IdentifyError>;
