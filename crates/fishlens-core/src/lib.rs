//! FishLens Core - fish identification from image classifier output.
//!
//! FishLens takes an image, asks a classifier for ranked `(label, score)`
//! pairs and interprets them: the top entries are kept, fish-relevant labels
//! get best-effort genus/species strings, and the result carries a
//! "no fish detected" signal when nothing looked like a fish.
//!
//! ```text
//! Image → Validate → Classify (onnx | http | fixed) → Normalize → Interpret → JSON / cards
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use fishlens_core::{Config, FishLens};
//!
//! #[tokio::main]
//! async fn main() -> fishlens_core::Result<()> {
//!     let config = Config::load()?;
//!     let lens = FishLens::new(config).await?;
//!
//!     let result = lens.identify_path("./catch.jpg".as_ref()).await?;
//!     for fish in result.fish() {
//!         println!("{} ({:.0}%)", fish.label, fish.score * 100.0);
//!     }
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod input;
pub mod interpret;
pub mod output;
pub mod session;
pub mod types;

pub use classifier::{normalize_ranking, Classifier, ClassifierFactory};
pub use config::Config;
pub use error::{ConfigError, FishLensError, IdentifyError, IdentifyResult, Result};
pub use input::{FileDiscovery, ImageInput, Validator};
pub use interpret::{FishResultInterpreter, Interpretation, KeywordHeuristic, TaxonomyStrategy};
pub use output::{OutputFormat, OutputWriter};
pub use session::{Session, SessionEffect, SessionEvent, SessionState};
pub use types::{ClassificationEntry, ConfidenceTier, Identification, IdentificationRecord};

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The identification pipeline: validator, classifier and interpreter.
pub struct FishLens {
    config: Config,
    validator: Validator,
    classifier: Box<dyn Classifier>,
    interpreter: FishResultInterpreter,
    next_request_id: AtomicU64,
}

impl FishLens {
    /// Build the pipeline with the classifier backend named in `config`.
    pub async fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing FishLens v{}", VERSION);
        let classifier = ClassifierFactory::create(&config)?;
        Ok(Self::with_classifier(config, classifier))
    }

    /// Build the pipeline around an already constructed classifier.
    pub fn with_classifier(config: Config, classifier: Box<dyn Classifier>) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            interpreter: FishResultInterpreter::from_config(&config.interpreter),
            classifier,
            config,
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Replace the interpreter (e.g. to plug in a different taxonomy strategy).
    pub fn with_interpreter(mut self, interpreter: FishResultInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn interpreter(&self) -> &FishResultInterpreter {
        &self.interpreter
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Identify an image under a freshly allocated request id.
    pub async fn identify(&self, image: &ImageInput) -> IdentifyResult<Identification> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        self.identify_request(request_id, image).await
    }

    /// Read an image file and identify it.
    pub async fn identify_path(&self, path: &Path) -> IdentifyResult<Identification> {
        let image = ImageInput::read_path(path, self.config.limits.max_file_bytes()).await?;
        self.identify(&image).await
    }

    /// Identify an image under a caller-chosen request id.
    ///
    /// Used by [`Session`] drivers, which allocate ids themselves. The
    /// classifier is invoked once; failures are returned, never retried.
    pub async fn identify_request(
        &self,
        request_id: u64,
        image: &ImageInput,
    ) -> IdentifyResult<Identification> {
        let start = Instant::now();
        self.validator.validate(image)?;
        tracing::debug!(
            "Request {request_id}: classifying {} ({}, {} bytes) with {}",
            image.source,
            image.media_type,
            image.len(),
            self.classifier.name()
        );

        let timeout_ms = self.config.limits.classify_timeout_ms;
        let entries = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.classifier.classify(image),
        )
        .await
        .map_err(|_| {
            IdentifyError::unavailable(
                self.classifier.name(),
                format!("classification timed out after {timeout_ms}ms"),
            )
        })??;
        tracing::trace!("  Classify: {:?} ({} entries)", start.elapsed(), entries.len());

        let ranked = normalize_ranking(entries);
        let Interpretation {
            records,
            no_fish_detected,
        } = self.interpreter.interpret(&ranked);

        let identification = Identification {
            request_id,
            source: image.source.clone(),
            classifier: self.classifier.name().to_string(),
            records,
            no_fish_detected,
            latency_ms: start.elapsed().as_millis() as u64,
        };
        tracing::debug!(
            "Request {request_id}: {} records, no_fish_detected={} in {}ms",
            identification.records.len(),
            identification.no_fish_detected,
            identification.latency_ms
        );
        Ok(identification)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// Encode a solid-color PNG of the given size.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([20, 90, 160])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }
}
