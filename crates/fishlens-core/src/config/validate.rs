//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{ClassifierBackend, Config};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.interpreter.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "interpreter.top_k must be > 0".into(),
            ));
        }
        if self.interpreter.keywords.is_empty() {
            return Err(ConfigError::ValidationError(
                "interpreter.keywords must not be empty".into(),
            ));
        }
        if self.interpreter.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "interpreter.keywords must not contain blank entries".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.classify_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.classify_timeout_ms must be > 0".into(),
            ));
        }
        if self.classifier.onnx.image_size == 0 {
            return Err(ConfigError::ValidationError(
                "classifier.onnx.image_size must be > 0".into(),
            ));
        }
        if self.classifier.onnx.std.iter().any(|s| *s <= 0.0) {
            return Err(ConfigError::ValidationError(
                "classifier.onnx.std values must be > 0".into(),
            ));
        }
        if self.classifier.backend == ClassifierBackend::Http
            && self.classifier.http.endpoint.trim().is_empty()
        {
            return Err(ConfigError::ValidationError(
                "classifier.http.endpoint must be set for the http backend".into(),
            ));
        }
        for entry in &self.classifier.fixed.entries {
            if !(0.0..=1.0).contains(&entry.score) {
                return Err(ConfigError::ValidationError(format!(
                    "classifier.fixed entry '{}' has score {} outside 0.0..=1.0",
                    entry.label, entry.score
                )));
            }
        }
        Ok(())
    }
}
