//! Sub-configuration structs with their defaults.

use crate::interpret::DEFAULT_FISH_KEYWORDS;
use crate::types::ClassificationEntry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where classifier models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.fishlens/models"),
        }
    }
}

/// Which classifier backend answers identification requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Local ONNX Runtime model
    #[default]
    Onnx,
    /// Remote HTTP inference endpoint
    Http,
    /// Fixed list of entries (stub)
    Fixed,
}

impl ClassifierBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Onnx => "onnx",
            Self::Http => "http",
            Self::Fixed => "fixed",
        }
    }
}

impl std::fmt::Display for ClassifierBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Active backend
    pub backend: ClassifierBackend,

    /// Local ONNX model settings
    pub onnx: OnnxConfig,

    /// Remote endpoint settings
    pub http: HttpConfig,

    /// Stub settings
    pub fixed: FixedConfig,
}

/// Local ONNX classifier settings.
///
/// The model is expected at `{model_dir}/{model}/model.onnx` with one label
/// per line in `{model_dir}/{model}/labels.txt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnnxConfig {
    /// Model directory name under `general.model_dir`
    pub model: String,

    /// Square input size in pixels
    pub image_size: u32,

    /// Per-channel normalization mean (RGB)
    pub mean: [f32; 3],

    /// Per-channel normalization std (RGB)
    pub std: [f32; 3],

    /// Apply softmax to the raw output. Disable for models that already
    /// emit probabilities.
    pub softmax: bool,
}

impl Default for OnnxConfig {
    fn default() -> Self {
        Self {
            model: "mobilenetv2-12".to_string(),
            image_size: 224,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
            softmax: true,
        }
    }
}

/// Remote classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Endpoint that accepts raw image bytes and answers `[{label, score}]`
    pub endpoint: String,

    /// Bearer token (supports ${ENV_VAR} syntax). Empty disables auth.
    pub api_key: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models/google/vit-base-patch16-224"
                .to_string(),
            api_key: "${HF_API_TOKEN}".to_string(),
        }
    }
}

/// Stub classifier settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedConfig {
    /// Entries returned for every image
    pub entries: Vec<ClassificationEntry>,
}

/// Interpretation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Number of classifier entries kept before interpretation
    pub top_k: usize,

    /// Substrings that mark a label as fish-relevant
    pub keywords: Vec<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            keywords: DEFAULT_FISH_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Classifier call timeout in milliseconds
    pub classify_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            classify_timeout_ms: 60000,
        }
    }
}

impl LimitsConfig {
    /// The size cap in bytes, saturating for huge configured values.
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Directory discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extensions picked up when a directory is given
    pub supported_formats: Vec<String>,

    /// Descend into subdirectories
    pub recursive: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
            ],
            recursive: false,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("text", "json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
