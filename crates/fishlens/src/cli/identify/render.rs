//! Terminal rendering of identification results as cards.

use console::style;
use fishlens_core::{ConfidenceTier, Identification, IdentificationRecord, IdentifyError};
use std::fmt::Write;

const LABEL_WIDTH: usize = 32;

/// Render one result: a header line, one card per record, and the
/// "no fish detected" notice when it applies.
pub fn render_identification(identification: &Identification, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {}",
        style(&identification.source).bold().force_styling(color),
        style(format!(
            "({}, {}ms)",
            identification.classifier, identification.latency_ms
        ))
        .dim()
        .force_styling(color)
    );

    for (rank, record) in identification.records.iter().enumerate() {
        render_record(&mut out, rank + 1, record, color);
    }

    if identification.records.is_empty() {
        let _ = writeln!(out, "  The classifier returned no labels.");
    }
    if identification.no_fish_detected {
        let _ = writeln!(
            out,
            "  {}",
            style("No fish detected. Try a closer, well-lit photo of the fish.")
                .yellow()
                .force_styling(color)
        );
    }
    out
}

fn render_record(out: &mut String, rank: usize, record: &IdentificationRecord, color: bool) {
    let label: String = record.label.chars().take(LABEL_WIDTH).collect();
    let _ = writeln!(
        out,
        "  {rank}. {label:<width$} {:>4.0}%  {}",
        record.score * 100.0,
        tier_badge(record.tier(), color),
        width = LABEL_WIDTH
    );

    if let (Some(genus), Some(species)) = (&record.genus, &record.species) {
        let _ = writeln!(
            out,
            "     {} {genus}  {} {species}",
            style("genus:").dim().force_styling(color),
            style("species:").dim().force_styling(color)
        );
    }
}

fn tier_badge(tier: ConfidenceTier, color: bool) -> String {
    let text = format!("[{}]", tier.as_str().to_uppercase());
    let styled = match tier {
        ConfidenceTier::High => style(text).green(),
        ConfidenceTier::Medium => style(text).yellow(),
        ConfidenceTier::Low => style(text).red(),
    };
    styled.force_styling(color).to_string()
}

/// One-shot notice for a failed identification.
pub fn render_failure(source: &str, error: &IdentifyError) -> String {
    match error {
        IdentifyError::InvalidInput { message, .. } => {
            format!("{source}: not a usable image ({message}).")
        }
        IdentifyError::ClassificationUnavailable { backend, message } => format!(
            "{source}: could not identify fish, the '{backend}' classifier is unavailable \
             ({message}). You can try again."
        ),
    }
}
