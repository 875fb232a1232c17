//! CLI enum types for the identify command.

use clap::ValueEnum;
use fishlens_core::config::ClassifierBackend;
use fishlens_core::OutputFormat as CoreOutputFormat;

/// How results are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable result cards
    Text,
    /// Single JSON object, or an array for a directory
    Json,
    /// One JSON object per line
    Jsonl,
}

impl OutputFormat {
    /// Parse the `output.format` config value.
    pub fn from_config(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("text") {
            return Some(Self::Text);
        }
        CoreOutputFormat::parse(value).map(|f| match f {
            CoreOutputFormat::Json => Self::Json,
            CoreOutputFormat::JsonLines => Self::Jsonl,
        })
    }

    /// The matching core writer format; `None` for text.
    pub fn serialized(self) -> Option<CoreOutputFormat> {
        match self {
            Self::Text => None,
            Self::Json => Some(CoreOutputFormat::Json),
            Self::Jsonl => Some(CoreOutputFormat::JsonLines),
        }
    }
}

/// Classifier backend override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Local ONNX model
    Onnx,
    /// Remote inference endpoint
    Http,
    /// Fixed entries from config (for testing)
    Fixed,
}

impl From<Backend> for ClassifierBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Onnx => ClassifierBackend::Onnx,
            Backend::Http => ClassifierBackend::Http,
            Backend::Fixed => ClassifierBackend::Fixed,
        }
    }
}
