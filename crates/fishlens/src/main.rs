//! FishLens CLI - identify fish in photos.
//!
//! Runs an image classifier over a photo and reports which of the top labels
//! look like fish, with best-effort genus/species names and a confidence badge.
//!
//! # Usage
//!
//! ```bash
//! # Identify a single photo
//! fishlens identify catch.jpg
//!
//! # Identify every photo in a directory as JSON Lines
//! fishlens identify ./trip/ --format jsonl --output results.jsonl
//!
//! # Fetch the default local classifier
//! fishlens models download
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// FishLens - identify fish in photos.
#[derive(Parser, Debug)]
#[command(name = "fishlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Identify fish in an image, a directory of images, or a data URI
    Identify(cli::identify::IdentifyArgs),

    /// Manage local classifier models
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging is not up yet, so config problems go straight to stderr.
    let config = match fishlens_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `fishlens config path`."
            );
            fishlens_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("FishLens v{}", fishlens_core::VERSION);

    match cli.command {
        Commands::Identify(args) => cli::identify::execute(args, config).await,
        Commands::Models(args) => cli::models::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config),
    }
}
