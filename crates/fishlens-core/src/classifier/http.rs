//! Remote classifier backend.
//!
//! Talks to an image-classification endpoint that accepts raw image bytes and
//! answers with a JSON array of `{label, score}` objects (the Hugging Face
//! Inference API shape). Some deployments wrap the array in another array
//! (one per input image); both are accepted.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Instant;

use crate::error::{IdentifyError, IdentifyResult};
use crate::input::ImageInput;
use crate::types::ClassificationEntry;

use super::provider::Classifier;

const BACKEND: &str = "http";

/// Classifier backed by an HTTP inference endpoint.
pub struct HttpClassifier {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpClassifier {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Response body: flat list, or one list per submitted image.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Flat(Vec<ClassificationEntry>),
    Nested(Vec<Vec<ClassificationEntry>>),
}

/// Parse an endpoint response body into entries.
pub(crate) fn parse_response(body: &str) -> IdentifyResult<Vec<ClassificationEntry>> {
    let parsed: ClassifyResponse = serde_json::from_str(body).map_err(|e| {
        IdentifyError::unavailable(BACKEND, format!("Failed to parse classifier response: {e}"))
    })?;

    Ok(match parsed {
        ClassifyResponse::Flat(entries) => entries,
        ClassifyResponse::Nested(mut batches) => {
            if batches.is_empty() {
                Vec::new()
            } else {
                batches.swap_remove(0)
            }
        }
    })
}

#[async_trait]
impl Classifier for HttpClassifier {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn classify(&self, image: &ImageInput) -> IdentifyResult<Vec<ClassificationEntry>> {
        let start = Instant::now();

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, image.media_type.as_str())
            .body(image.bytes.clone());
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let resp = request.send().await.map_err(|e| {
            IdentifyError::unavailable(BACKEND, format!("Request to {} failed: {e}", self.endpoint))
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            IdentifyError::unavailable(BACKEND, format!("Failed to read response body: {e}"))
        })?;
        if !status.is_success() {
            return Err(IdentifyError::unavailable(
                BACKEND,
                format!("HTTP {status}: {}", text.trim()),
            ));
        }

        let entries = parse_response(&text)?;
        tracing::debug!(
            "HTTP classifier returned {} entries for {} in {:?}",
            entries.len(),
            image.source,
            start.elapsed()
        );
        Ok(entries)
    }
}
