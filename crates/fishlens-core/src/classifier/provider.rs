//! Classifier trait and the factory that builds a backend from config.

use async_trait::async_trait;

use crate::config::{ClassifierBackend, Config};
use crate::error::{IdentifyError, IdentifyResult};
use crate::input::ImageInput;
use crate::types::ClassificationEntry;

use super::fixed::FixedClassifier;
use super::http::HttpClassifier;
use super::onnx::OnnxClassifier;

/// Capability that maps an image to ranked (label, score) pairs.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn Classifier>` for dynamic dispatch).
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Backend name for logging (e.g., "onnx", "http").
    fn name(&self) -> &str;

    /// Classify an image. Entries should be ordered by descending score;
    /// callers normalize the ranking regardless.
    async fn classify(&self, image: &ImageInput) -> IdentifyResult<Vec<ClassificationEntry>>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the configured classifier backend.
pub struct ClassifierFactory;

impl ClassifierFactory {
    /// Create the backend named by `config.classifier.backend`.
    ///
    /// Initialization failures (missing model files, broken runtime) surface
    /// as [`IdentifyError::ClassificationUnavailable`].
    pub fn create(config: &Config) -> IdentifyResult<Box<dyn Classifier>> {
        let backend = config.classifier.backend;
        tracing::debug!("Creating classifier backend: {backend}");

        match backend {
            ClassifierBackend::Onnx => {
                let classifier = OnnxClassifier::load(
                    &config.classifier.onnx,
                    &config.onnx_model_dir(),
                    config.limits.clone(),
                )?;
                Ok(Box::new(classifier))
            }
            ClassifierBackend::Http => {
                let http = &config.classifier.http;
                if http.endpoint.trim().is_empty() {
                    return Err(IdentifyError::unavailable(
                        backend.as_str(),
                        "no endpoint configured",
                    ));
                }
                let api_key = resolve_env_var(&http.api_key);
                if api_key.is_none() {
                    tracing::debug!(
                        "No API key resolved for HTTP classifier; sending unauthenticated requests"
                    );
                }
                Ok(Box::new(HttpClassifier::new(&http.endpoint, api_key)))
            }
            ClassifierBackend::Fixed => Ok(Box::new(FixedClassifier::new(
                config.classifier.fixed.entries.clone(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_env_var() {
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        assert_eq!(resolve_env_var(""), None);
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_FISHLENS_123}"), None);
    }

    #[test]
    fn test_factory_fixed() {
        let mut config = Config::default();
        config.classifier.backend = ClassifierBackend::Fixed;
        let classifier = ClassifierFactory::create(&config).unwrap();
        assert_eq!(classifier.name(), "fixed");
    }

    #[test]
    fn test_factory_http() {
        let mut config = Config::default();
        config.classifier.backend = ClassifierBackend::Http;
        config.classifier.http.api_key = String::new();
        let classifier = ClassifierFactory::create(&config).unwrap();
        assert_eq!(classifier.name(), "http");
    }

    #[test]
    fn test_factory_http_without_endpoint_unavailable() {
        let mut config = Config::default();
        config.classifier.backend = ClassifierBackend::Http;
        config.classifier.http.endpoint = " ".to_string();
        let err = ClassifierFactory::create(&config).err().unwrap();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_factory_onnx_missing_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();
        let err = ClassifierFactory::create(&config).err().unwrap();
        match err {
            IdentifyError::ClassificationUnavailable { backend, message } => {
                assert_eq!(backend, "onnx");
                assert!(message.contains("models download"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
