//! The `fishlens models` command for managing local classifier models.
//!
//! Each model lives in `{model_dir}/{name}/` as `model.onnx` plus
//! `labels.txt`, which is the layout the ONNX backend loads.

use clap::{Args, Subcommand};
use fishlens_core::classifier::{OnnxClassifier, LABELS_FILENAME, MODEL_FILENAME};
use fishlens_core::Config;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download a classifier model and its ImageNet labels
    Download {
        /// Model to download (defaults to `classifier.onnx.model` from config)
        #[arg(long)]
        model: Option<String>,

        /// Re-download files that already exist
        #[arg(long)]
        force: bool,
    },

    /// List known models and whether they are installed
    List,

    /// Print the model directory path
    Path,
}

/// A downloadable ImageNet classifier.
struct RemoteModel {
    name: &'static str,
    label: &'static str,
    model_url: &'static str,
}

const REMOTE_MODELS: &[RemoteModel] = &[
    RemoteModel {
        name: "mobilenetv2-12",
        label: "MobileNet v2 (14 MB, fast)",
        model_url: "https://github.com/onnx/models/raw/main/validated/vision/classification/mobilenet/model/mobilenetv2-12.onnx",
    },
    RemoteModel {
        name: "resnet50-v2-7",
        label: "ResNet-50 v2 (98 MB, more accurate)",
        model_url: "https://github.com/onnx/models/raw/main/validated/vision/classification/resnet/model/resnet50-v2-7.onnx",
    },
];

/// The 1000 ImageNet class names, one per line in class-index order.
const IMAGENET_LABELS_URL: &str =
    "https://raw.githubusercontent.com/pytorch/hub/master/imagenet_classes.txt";

fn find_model(name: &str) -> Option<&'static RemoteModel> {
    REMOTE_MODELS.iter().find(|m| m.name == name)
}

/// Install status of one model directory.
#[derive(Debug, PartialEq, Eq)]
enum ModelStatus {
    Ready,
    Partial,
    Missing,
}

impl ModelStatus {
    fn of(dir: &Path) -> Self {
        if OnnxClassifier::model_exists(dir) {
            Self::Ready
        } else if dir.join(MODEL_FILENAME).exists() || dir.join(LABELS_FILENAME).exists() {
            Self::Partial
        } else {
            Self::Missing
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Partial => "incomplete",
            Self::Missing => "not installed",
        }
    }
}

pub async fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::Download { model, force } => {
            let name = model.unwrap_or_else(|| config.classifier.onnx.model.clone());
            let remote = find_model(&name).ok_or_else(|| {
                let known: Vec<_> = REMOTE_MODELS.iter().map(|m| m.name).collect();
                anyhow::anyhow!(
                    "Unknown model '{name}'. Known models: {}.\n  \
                     Custom models can be placed manually in {} as {MODEL_FILENAME} + {LABELS_FILENAME}.",
                    known.join(", "),
                    config.model_dir().join(&name).display()
                )
            })?;

            let dir = config.model_dir().join(remote.name);
            std::fs::create_dir_all(&dir)?;
            let client = reqwest::Client::new();

            tracing::info!("Downloading {}...", remote.label);
            fetch(&client, remote.model_url, &dir.join(MODEL_FILENAME), force).await?;
            fetch(&client, IMAGENET_LABELS_URL, &dir.join(LABELS_FILENAME), force).await?;

            if remote.name != config.classifier.onnx.model {
                println!(
                    "Downloaded {}. Set `classifier.onnx.model = \"{}\"` in your config to use it.",
                    remote.name, remote.name
                );
            } else {
                println!("Downloaded {} to {}", remote.name, dir.display());
            }
        }

        ModelsCommand::List => {
            let model_dir = config.model_dir();
            println!("Models in {}:\n", model_dir.display());
            for remote in REMOTE_MODELS {
                let status = ModelStatus::of(&model_dir.join(remote.name));
                let marker = if remote.name == config.classifier.onnx.model {
                    "  (configured)"
                } else {
                    ""
                };
                println!(
                    "  - {:18} {:14} {}{}",
                    remote.name,
                    status.as_str(),
                    remote.label,
                    marker
                );
            }

            let configured = &config.classifier.onnx.model;
            if find_model(configured).is_none() {
                let status = ModelStatus::of(&config.onnx_model_dir());
                println!("  - {:18} {:14} custom  (configured)", configured, status.as_str());
            }
        }

        ModelsCommand::Path => {
            println!("{}", config.model_dir().display());
        }
    }

    Ok(())
}

/// Download `url` to `dest` unless it already exists (or `force` is set).
async fn fetch(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    force: bool,
) -> anyhow::Result<()> {
    if dest.exists() && !force {
        tracing::info!("  {} already exists, skipping", dest.display());
        return Ok(());
    }
    tracing::info!("  Source: {url}");
    tracing::info!("  Destination: {}", dest.display());
    download_file(client, url, dest).await
}

/// Stream a URL to disk with a progress bar.
///
/// Bytes land in a `.part` file that is renamed into place once complete.
async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> anyhow::Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed: {e}"))?;

    let progress = create_download_bar(response.content_length());
    let part = partial_path(dest);
    let mut file = tokio::fs::File::create(&part).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                progress.abandon();
                let _ = tokio::fs::remove_file(&part).await;
                anyhow::bail!("Download interrupted: {e}");
            }
        };
        file.write_all(&chunk).await?;
        progress.inc(chunk.len() as u64);
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&part, dest).await?;
    progress.finish_and_clear();

    let size = std::fs::metadata(dest)?.len();
    tracing::info!("  Complete ({:.1} MB)", size as f64 / (1024.0 * 1024.0));
    Ok(())
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

fn create_download_bar(total: Option<u64>) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    match total {
        Some(total) => {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
            ) {
                pb.set_style(style.progress_chars("##-"));
            }
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {bytes}")
            {
                pb.set_style(style);
            }
            pb
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_is_downloadable() {
        let config = Config::default();
        assert!(find_model(&config.classifier.onnx.model).is_some());
        assert!(find_model("nope").is_none());
    }

    #[test]
    fn test_model_status() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ModelStatus::of(dir.path()), ModelStatus::Missing);

        std::fs::write(dir.path().join(MODEL_FILENAME), b"onnx").unwrap();
        assert_eq!(ModelStatus::of(dir.path()), ModelStatus::Partial);

        std::fs::write(dir.path().join(LABELS_FILENAME), b"tench\n").unwrap();
        assert_eq!(ModelStatus::of(dir.path()), ModelStatus::Ready);
    }

    #[test]
    fn test_partial_path_appends_suffix() {
        let dest = Path::new("/models/mobilenetv2-12/model.onnx");
        assert_eq!(
            partial_path(dest),
            PathBuf::from("/models/mobilenetv2-12/model.onnx.part")
        );
    }

    #[tokio::test]
    async fn test_fetch_skips_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join(LABELS_FILENAME);
        std::fs::write(&dest, "tench\n").unwrap();

        // The URL is never contacted because the file already exists.
        let client = reqwest::Client::new();
        fetch(&client, "http://127.0.0.1:9/unreachable", &dest, false)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "tench\n");
    }
}
