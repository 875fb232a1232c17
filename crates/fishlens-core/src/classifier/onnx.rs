//! Local classifier backend running an ImageNet-style model via ONNX Runtime.
//!
//! Expects `{model_dir}/model.onnx` producing one score per class and
//! `{model_dir}/labels.txt` with one label per line in class-index order.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::config::{LimitsConfig, OnnxConfig};
use crate::error::{IdentifyError, IdentifyResult};
use crate::input::{ImageDecoder, ImageInput};
use crate::types::ClassificationEntry;

use super::preprocess::{preprocess, softmax};
use super::provider::Classifier;

const BACKEND: &str = "onnx";

/// Model filename inside the model directory.
pub const MODEL_FILENAME: &str = "model.onnx";

/// Labels filename inside the model directory.
pub const LABELS_FILENAME: &str = "labels.txt";

/// ONNX Runtime image classifier.
///
/// The session sits behind a `Mutex` because `Session::run` requires
/// `&mut self`, and behind an `Arc` so inference can run on the blocking pool.
pub struct OnnxClassifier {
    session: Arc<Mutex<Session>>,
    input_name: String,
    labels: Arc<Vec<String>>,
    config: OnnxConfig,
    decoder: ImageDecoder,
}

impl OnnxClassifier {
    /// Load the model and labels from `model_dir`.
    pub fn load(
        config: &OnnxConfig,
        model_dir: &Path,
        limits: LimitsConfig,
    ) -> IdentifyResult<Self> {
        let model_path = Self::model_path(model_dir);
        let labels_path = model_dir.join(LABELS_FILENAME);

        if !model_path.exists() {
            return Err(IdentifyError::unavailable(
                BACKEND,
                format!(
                    "Model not found at {}. Run `fishlens models download` first.",
                    model_path.display()
                ),
            ));
        }
        let labels = load_labels(&labels_path)?;

        tracing::info!("Loading classifier model from {:?}", model_path);
        let session = Session::builder()
            .map_err(|e| {
                IdentifyError::unavailable(
                    BACKEND,
                    format!("Failed to create ONNX session builder: {e}"),
                )
            })?
            .commit_from_file(&model_path)
            .map_err(|e| {
                IdentifyError::unavailable(BACKEND, format!("Failed to load ONNX model: {e}"))
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input".to_string());

        tracing::debug!(
            "Loaded classifier (input: {:?}, {} labels)",
            input_name,
            labels.len()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            labels: Arc::new(labels),
            config: config.clone(),
            decoder: ImageDecoder::new(limits),
        })
    }

    /// Check whether the model and labels exist on disk.
    pub fn model_exists(model_dir: &Path) -> bool {
        Self::model_path(model_dir).exists() && model_dir.join(LABELS_FILENAME).exists()
    }

    /// Get the expected model file path.
    pub fn model_path(model_dir: &Path) -> PathBuf {
        model_dir.join(MODEL_FILENAME)
    }
}

/// Read one label per line. Trailing blank lines are ignored; inner blank
/// lines are kept so indices stay aligned with model outputs.
fn load_labels(path: &Path) -> IdentifyResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        IdentifyError::unavailable(
            BACKEND,
            format!("Cannot read labels file {}: {e}", path.display()),
        )
    })?;

    let mut labels: Vec<String> = content.lines().map(|l| l.trim().to_string()).collect();
    while labels.last().is_some_and(|l| l.is_empty()) {
        labels.pop();
    }
    if labels.is_empty() {
        return Err(IdentifyError::unavailable(
            BACKEND,
            format!("Labels file {} is empty", path.display()),
        ));
    }
    Ok(labels)
}

/// Pair scores with labels and sort by descending score.
pub(crate) fn rank(labels: &[String], scores: &[f32]) -> IdentifyResult<Vec<ClassificationEntry>> {
    if labels.len() != scores.len() {
        return Err(IdentifyError::unavailable(
            BACKEND,
            format!(
                "Labels file has {} entries but model produced {} scores",
                labels.len(),
                scores.len()
            ),
        ));
    }

    let mut entries: Vec<ClassificationEntry> = labels
        .iter()
        .zip(scores)
        .filter(|(label, _)| !label.is_empty())
        .map(|(label, &score)| ClassificationEntry::new(label.clone(), score))
        .collect();
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(entries)
}

/// Run the session on a preprocessed tensor and return per-class scores.
fn run_session(
    session: &Mutex<Session>,
    input_name: &str,
    tensor: &Array4<f32>,
) -> IdentifyResult<Vec<f32>> {
    // Convert ndarray to (shape, flat_data) for ort.
    let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
    let flat_data: Vec<f32> = tensor.iter().copied().collect();

    let input_value = Value::from_array((shape, flat_data)).map_err(|e| {
        IdentifyError::unavailable(BACKEND, format!("Failed to create input tensor: {e}"))
    })?;
    let inputs = ort::inputs![input_name => input_value];

    let mut session = session.lock().map_err(|e| {
        IdentifyError::unavailable(BACKEND, format!("Session lock poisoned: {e}"))
    })?;
    let outputs = session
        .run(inputs)
        .map_err(|e| IdentifyError::unavailable(BACKEND, format!("ONNX inference failed: {e}")))?;

    let first = outputs
        .iter()
        .next()
        .ok_or_else(|| IdentifyError::unavailable(BACKEND, "Model produced no outputs"))?;

    let (shape, data) = first.1.try_extract_tensor::<f32>().map_err(|e| {
        IdentifyError::unavailable(BACKEND, format!("Failed to extract output tensor: {e}"))
    })?;

    // Output is [classes] or [1, classes].
    match shape.len() {
        1 => Ok(data.to_vec()),
        2 => {
            let classes = shape[1] as usize;
            Ok(data[..classes].to_vec())
        }
        _ => Err(IdentifyError::unavailable(
            BACKEND,
            format!("Unexpected output shape: {:?}", shape),
        )),
    }
}

#[async_trait]
impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn classify(&self, image: &ImageInput) -> IdentifyResult<Vec<ClassificationEntry>> {
        let start = Instant::now();

        let decoded = self
            .decoder
            .decode(image.bytes.clone())
            .await
            .map_err(|e| IdentifyError::unavailable(BACKEND, e.to_string()))?;
        tracing::trace!("  Decode: {:?} ({}x{})", start.elapsed(), decoded.width, decoded.height);

        let session = Arc::clone(&self.session);
        let labels = Arc::clone(&self.labels);
        let input_name = self.input_name.clone();
        let config = self.config.clone();

        let entries = tokio::task::spawn_blocking(move || {
            let tensor = preprocess(&decoded.image, config.image_size, config.mean, config.std);
            let raw = run_session(&session, &input_name, &tensor)?;
            let scores = if config.softmax { softmax(&raw) } else { raw };
            rank(&labels, &scores)
        })
        .await
        .map_err(|e| IdentifyError::unavailable(BACKEND, format!("Task join error: {e}")))??;

        tracing::debug!(
            "ONNX classifier ranked {} labels for {} in {:?}",
            entries.len(),
            image.source,
            start.elapsed()
        );
        Ok(entries)
    }
}
