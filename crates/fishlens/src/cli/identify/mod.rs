//! The `fishlens identify` command.
//!
//! Each image goes through a [`Session`]: it is chosen, analysis is
//! requested, and the resulting effect runs the pipeline. Directories are
//! processed one image at a time.

mod render;
pub mod types;

pub use types::{Backend, OutputFormat};

use clap::Args;
use console::Term;
use fishlens_core::{
    Config, FileDiscovery, FishLens, Identification, IdentifyError, ImageInput, OutputWriter,
    Session, SessionEffect, SessionEvent, SessionState,
};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use render::{render_failure, render_identification};

#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// Image file, directory of images, or (with --data-uri) a data URI; `-` reads stdin
    #[arg(required = true)]
    pub input: String,

    /// Number of top labels to keep
    #[arg(short = 'k', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub top_k: Option<u32>,

    /// Output format (defaults to `output.format` from config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Classifier backend (defaults to `classifier.backend` from config)
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Inference endpoint for the http backend
    #[arg(long, env = "FISHLENS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Treat INPUT as a `data:image/...;base64,` URI
    #[arg(long)]
    pub data_uri: bool,

    /// Walk subdirectories when INPUT is a directory
    #[arg(short, long)]
    pub recursive: bool,
}

/// Where results go.
enum Sink {
    Text { out: Box<dyn Write>, color: bool },
    Serialized {
        writer: OutputWriter<Box<dyn Write>>,
        batch: bool,
        collected: Vec<Identification>,
    },
}

impl Sink {
    fn new(
        args: &IdentifyArgs,
        format: OutputFormat,
        pretty: bool,
        batch: bool,
    ) -> anyhow::Result<Self> {
        let (out, is_terminal): (Box<dyn Write>, bool) = match &args.output {
            Some(path) => (Box::new(BufWriter::new(File::create(path)?)), false),
            None => (Box::new(std::io::stdout()), Term::stdout().is_term()),
        };

        Ok(match format.serialized() {
            None => Sink::Text {
                out,
                color: is_terminal,
            },
            Some(core_format) => Sink::Serialized {
                writer: OutputWriter::new(out, core_format, pretty),
                batch,
                collected: Vec::new(),
            },
        })
    }

    fn emit(&mut self, identification: Identification) -> anyhow::Result<()> {
        match self {
            Sink::Text { out, color } => {
                writeln!(out, "{}", render_identification(&identification, *color))?;
            }
            Sink::Serialized {
                writer,
                batch,
                collected,
            } => {
                // A JSON batch is one array, so it waits for the end.
                if *batch && writer.format() == fishlens_core::OutputFormat::Json {
                    collected.push(identification);
                } else {
                    writer.write(&identification)?;
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> anyhow::Result<()> {
        match self {
            Sink::Text { mut out, .. } => out.flush()?,
            Sink::Serialized {
                mut writer,
                collected,
                batch,
            } => {
                if batch && writer.format() == fishlens_core::OutputFormat::Json {
                    writer.write_all(&collected)?;
                }
                writer.flush()?;
            }
        }
        Ok(())
    }
}

pub async fn execute(args: IdentifyArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config);

    let format = match args.format {
        Some(format) => format,
        None => OutputFormat::from_config(&config.output.format).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown output.format '{}' in config, using text",
                config.output.format
            );
            OutputFormat::Text
        }),
    };

    let sources = collect_sources(&args, &config)?;
    if sources.is_empty() {
        tracing::warn!("No supported image files found at {}", args.input);
        return Ok(());
    }

    let lens = match FishLens::new(config).await {
        Ok(lens) => lens,
        Err(fishlens_core::FishLensError::Identify(e)) => {
            anyhow::bail!("{}", render_failure(&args.input, &e))
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(
        "Identifying {} image(s) with the {} classifier (top {})",
        sources.len(),
        lens.classifier_name(),
        lens.interpreter().top_k()
    );

    let batch = sources.len() > 1;
    let pretty = lens.config().output.pretty;
    let mut sink = Sink::new(&args, format, pretty, batch)?;
    let progress = batch.then(|| create_progress_bar(sources.len() as u64));

    let max_bytes = lens.config().limits.max_file_bytes();
    let mut session = Session::new();
    let mut succeeded = 0u64;
    let mut failed = 0u64;
    let mut last_failure: Option<(String, IdentifyError)> = None;
    let start = Instant::now();

    for source in sources {
        let image = match source.load(max_bytes).await {
            Ok(image) => image,
            Err(e) => {
                failed += 1;
                last_failure = Some(report_failure(progress.as_ref(), source.name(), e));
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                continue;
            }
        };

        match run_session(&lens, &mut session, image).await {
            SessionState::Results { identification, .. } => {
                succeeded += 1;
                sink.emit(identification)?;
            }
            SessionState::Failed { image, error } => {
                failed += 1;
                last_failure = Some(report_failure(progress.as_ref(), image.source, error));
            }
            other => tracing::debug!("Session ended in unexpected state: {}", other.name()),
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
        eprintln!(
            "Identified {succeeded} image(s), {failed} failed in {:.1}s",
            start.elapsed().as_secs_f64()
        );
    }
    sink.finish()?;
    if let Some(path) = &args.output {
        tracing::info!("Output written to {}", path.display());
    }

    match last_failure {
        // A single image's failure has not been printed yet.
        Some((source, error)) if !batch => anyhow::bail!("{}", render_failure(&source, &error)),
        Some(_) if succeeded == 0 => {
            anyhow::bail!("None of the {failed} image(s) could be identified")
        }
        _ => Ok(()),
    }
}

/// Push one image through the session and run the effects it asks for.
async fn run_session(lens: &FishLens, session: &mut Session, image: ImageInput) -> SessionState {
    session.handle(SessionEvent::ImageChosen(image));
    let effects = session.handle(SessionEvent::AnalyzeRequested);

    for effect in effects {
        match effect {
            SessionEffect::StartAnalysis { request_id, image } => {
                let event = match lens.identify_request(request_id, &image).await {
                    Ok(identification) => SessionEvent::ClassifierResolved {
                        request_id,
                        identification,
                    },
                    Err(error) => SessionEvent::ClassifierFailed { request_id, error },
                };
                session.handle(event);
            }
        }
    }
    session.state().clone()
}

/// In a batch, print a failure above the progress bar as it happens. A
/// single image's failure is left to the caller so it is shown only once.
fn report_failure(
    progress: Option<&indicatif::ProgressBar>,
    source: String,
    error: IdentifyError,
) -> (String, IdentifyError) {
    tracing::debug!("{source}: {error}");
    if let Some(pb) = progress {
        let message = render_failure(&source, &error);
        pb.suspend(|| eprintln!("{message}"));
    }
    (source, error)
}

fn apply_overrides(args: &IdentifyArgs, config: &mut Config) {
    if let Some(top_k) = args.top_k {
        config.interpreter.top_k = top_k as usize;
    }
    if let Some(backend) = args.backend {
        config.classifier.backend = backend.into();
    }
    if let Some(endpoint) = &args.endpoint {
        config.classifier.http.endpoint = endpoint.clone();
    }
    if args.recursive {
        config.discovery.recursive = true;
    }
}

/// An image yet to be loaded.
enum Source {
    Path(PathBuf),
    DataUri(String),
}

impl Source {
    fn name(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::DataUri(_) => "data-uri".to_string(),
        }
    }

    async fn load(&self, max_bytes: u64) -> Result<ImageInput, IdentifyError> {
        match self {
            Source::Path(path) => ImageInput::read_path(path, max_bytes).await,
            Source::DataUri(uri) => ImageInput::from_data_uri(uri),
        }
    }
}

fn collect_sources(args: &IdentifyArgs, config: &Config) -> anyhow::Result<Vec<Source>> {
    if args.data_uri {
        let uri = if args.input == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            args.input.clone()
        };
        return Ok(vec![Source::DataUri(uri)]);
    }

    let path = PathBuf::from(&args.input);
    if !path.exists() {
        anyhow::bail!(
            "Input path does not exist: {}\n\n  Hint: Check the file path, or pass --data-uri for data URIs.",
            path.display()
        );
    }
    let discovery = FileDiscovery::new(config.discovery.clone());
    Ok(discovery.discover(&path).into_iter().map(Source::Path).collect())
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}
