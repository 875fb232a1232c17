//! Classification capability: the seam between FishLens and whatever model
//! produces ranked labels.
//!
//! Backends implement [`Classifier`]; [`ClassifierFactory`] picks one from
//! config. Three ship with the crate:
//! - **onnx**: local ImageNet-style model via ONNX Runtime
//! - **http**: remote inference endpoint
//! - **fixed**: deterministic stub

pub(crate) mod fixed;
pub(crate) mod http;
pub(crate) mod onnx;
pub(crate) mod preprocess;
pub(crate) mod provider;

pub use fixed::FixedClassifier;
pub use http::HttpClassifier;
pub use onnx::{OnnxClassifier, LABELS_FILENAME, MODEL_FILENAME};
pub use provider::{resolve_env_var, Classifier, ClassifierFactory};

use crate::types::ClassificationEntry;

/// Normalize backend output into a well-formed ranking.
///
/// Drops entries with blank labels, clamps scores into `[0, 1]` (NaN becomes
/// 0) and stable-sorts by descending score, so backends that already return a
/// ranking keep their tie order.
pub fn normalize_ranking(entries: Vec<ClassificationEntry>) -> Vec<ClassificationEntry> {
    let mut ranked: Vec<ClassificationEntry> = entries
        .into_iter()
        .filter(|e| !e.label.trim().is_empty())
        .map(|mut e| {
            e.score = if e.score.is_nan() {
                0.0
            } else {
                e.score.clamp(0.0, 1.0)
            };
            e
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}
