//! Core data types for the FishLens identification pipeline.
//!
//! A classifier produces [`ClassificationEntry`] values; the interpreter turns
//! them into [`IdentificationRecord`]s wrapped in an [`Identification`].

use serde::{Deserialize, Serialize};

/// A single (label, score) pair produced by a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    /// Free-text label from the model vocabulary (e.g. "tiger shark")
    pub label: String,

    /// Confidence score from 0.0 to 1.0
    pub score: f32,
}

impl ClassificationEntry {
    /// Create a new entry with the given label and score.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// An interpreted classification with optional taxonomic fields.
///
/// `species`, `genus` and `common_name` are either all present (the label was
/// judged fish-relevant) or all absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationRecord {
    /// The label as returned by the classifier
    pub label: String,

    /// The classifier score, unchanged
    pub score: f32,

    /// Best-effort "genus species" string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,

    /// Best-effort genus string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genus: Option<String>,

    /// The original label, kept as a common name
    #[serde(rename = "commonName", skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
}

impl IdentificationRecord {
    /// A record with no taxonomic fields.
    pub fn bare(entry: &ClassificationEntry) -> Self {
        Self {
            label: entry.label.clone(),
            score: entry.score,
            species: None,
            genus: None,
            common_name: None,
        }
    }

    /// Whether the record carries taxonomic fields.
    pub fn is_fish(&self) -> bool {
        self.species.is_some()
    }

    /// Confidence tier for display.
    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_score(self.score)
    }
}

/// Display badge for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// score > 0.7
    High,
    /// 0.4 <= score <= 0.7
    Medium,
    /// score < 0.4
    Low,
}

impl ConfidenceTier {
    pub fn from_score(score: f32) -> Self {
        if score > 0.7 {
            Self::High
        } else if score >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The complete output for one identification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identification {
    /// Monotonic id of the request that produced this result
    pub request_id: u64,

    /// Where the image came from (file path, "bytes", "data-uri")
    pub source: String,

    /// Name of the classifier backend that ran
    pub classifier: String,

    /// Interpreted records, in classifier order
    pub records: Vec<IdentificationRecord>,

    /// Advisory: true when no record carries a species
    pub no_fish_detected: bool,

    /// Classification + interpretation time in milliseconds
    pub latency_ms: u64,
}

impl Identification {
    /// Records judged fish-relevant.
    pub fn fish(&self) -> impl Iterator<Item = &IdentificationRecord> {
        self.records.iter().filter(|r| r.is_fish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ConfidenceTier::from_score(0.92), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(0.71), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(0.7), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(0.4), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(0.39), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_score(0.0), ConfidenceTier::Low);
    }

    #[test]
    fn test_bare_record_serde_skips_taxonomy() {
        let record = IdentificationRecord::bare(&ClassificationEntry::new("umbrella", 0.99));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"label\":\"umbrella\""));
        assert!(!json.contains("species"));
        assert!(!json.contains("genus"));
        assert!(!json.contains("commonName"));
    }

    #[test]
    fn test_fish_record_uses_camel_case_common_name() {
        let record = IdentificationRecord {
            label: "tiger shark".to_string(),
            score: 0.92,
            species: Some("tiger shark".to_string()),
            genus: Some("tiger".to_string()),
            common_name: Some("tiger shark".to_string()),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"commonName\":\"tiger shark\""));
        assert!(json.contains("\"genus\":\"tiger\""));

        let parsed: IdentificationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        assert!(parsed.is_fish());
    }

    #[test]
    fn test_identification_fish_iter() {
        let identification = Identification {
            request_id: 1,
            source: "bytes".to_string(),
            classifier: "fixed".to_string(),
            records: vec![
                IdentificationRecord {
                    label: "cod".to_string(),
                    score: 0.5,
                    species: Some("cod".to_string()),
                    genus: Some("cod".to_string()),
                    common_name: Some("cod".to_string()),
                },
                IdentificationRecord::bare(&ClassificationEntry::new("rock", 0.2)),
            ],
            no_fish_detected: false,
            latency_ms: 3,
        };
        let fish: Vec<_> = identification.fish().map(|r| r.label.as_str()).collect();
        assert_eq!(fish, vec!["cod"]);
    }
}
