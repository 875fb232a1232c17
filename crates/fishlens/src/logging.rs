//! Logging setup.
//!
//! Logs go to stderr so stdout stays clean for results. `RUST_LOG` wins over
//! everything else when set.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose info-level chatter drowns out ours.
const QUIET_TARGETS: &[&str] = &["ort=warn", "reqwest=warn", "hyper=warn"];

/// Install the global subscriber at `level`, pretty or JSON.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize from the `[logging]` config section plus CLI overrides.
pub fn init_from_config(config: &fishlens_core::Config, verbose: bool, json_logs: bool) {
    let level = effective_level(&config.logging.level, verbose);
    let json_format = json_logs || config.logging.format.eq_ignore_ascii_case("json");
    init(level, json_format);
}

/// `--verbose` raises the level to at least debug; unknown levels fall back to info.
fn effective_level(configured: &str, verbose: bool) -> &'static str {
    let level = match configured.trim().to_ascii_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };
    match (verbose, level) {
        (true, "trace") => "trace",
        (true, _) => "debug",
        (false, level) => level,
    }
}

fn filter_directives(level: &str) -> String {
    let mut directives = vec![level.to_string()];
    directives.extend(QUIET_TARGETS.iter().map(|t| t.to_string()));
    directives.join(",")
}
