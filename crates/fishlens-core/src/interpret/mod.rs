//! Interpretation of ranked classifier output.
//!
//! Truncates the classifier's ranked entries to `top_k`, marks fish-relevant
//! labels and derives genus/species strings for them. Pure and synchronous:
//! the output has the same order and (truncated) length as the input.

mod strategy;

pub use strategy::{KeywordHeuristic, TaxonomicNames, TaxonomyStrategy, DEFAULT_FISH_KEYWORDS};

use std::sync::Arc;

use crate::config::InterpreterConfig;
use crate::types::{ClassificationEntry, IdentificationRecord};

/// Default number of entries kept.
pub const DEFAULT_TOP_K: usize = 5;

/// Interpreter output: records plus the aggregate signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub records: Vec<IdentificationRecord>,
    pub no_fish_detected: bool,
}

/// Turns ranked [`ClassificationEntry`] values into [`IdentificationRecord`]s.
#[derive(Clone)]
pub struct FishResultInterpreter {
    top_k: usize,
    strategy: Arc<dyn TaxonomyStrategy>,
}

impl FishResultInterpreter {
    /// Create an interpreter with the default keyword heuristic.
    pub fn new(top_k: usize) -> Self {
        Self::with_strategy(top_k, Arc::new(KeywordHeuristic::default()))
    }

    /// Create an interpreter with a custom taxonomy strategy.
    pub fn with_strategy(top_k: usize, strategy: Arc<dyn TaxonomyStrategy>) -> Self {
        Self { top_k, strategy }
    }

    /// Build from the `[interpreter]` config section.
    pub fn from_config(config: &InterpreterConfig) -> Self {
        Self::with_strategy(
            config.top_k,
            Arc::new(KeywordHeuristic::new(&config.keywords)),
        )
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Return a copy with a different `top_k`, sharing the strategy.
    pub fn with_top_k(&self, top_k: usize) -> Self {
        Self {
            top_k,
            strategy: Arc::clone(&self.strategy),
        }
    }

    /// Whether a single label is fish-relevant under this interpreter's strategy.
    pub fn is_relevant(&self, label: &str) -> bool {
        self.strategy.is_relevant(label)
    }

    /// Interpret one entry.
    pub fn interpret_entry(&self, entry: &ClassificationEntry) -> IdentificationRecord {
        match self.strategy.derive(&entry.label) {
            Some(names) => IdentificationRecord {
                label: entry.label.clone(),
                score: entry.score,
                species: Some(names.species),
                genus: Some(names.genus),
                common_name: Some(names.common_name),
            },
            None => IdentificationRecord::bare(entry),
        }
    }

    /// Interpret ranked entries. Entries are assumed to be sorted already and
    /// are never reordered or re-scored.
    pub fn interpret(&self, entries: &[ClassificationEntry]) -> Interpretation {
        let records: Vec<IdentificationRecord> = entries
            .iter()
            .take(self.top_k)
            .map(|entry| self.interpret_entry(entry))
            .collect();

        let no_fish_detected = no_fish_detected(&records);
        tracing::debug!(
            "Interpreted {} of {} entries ({} fish)",
            records.len(),
            entries.len(),
            records.iter().filter(|r| r.is_fish()).count()
        );

        Interpretation {
            records,
            no_fish_detected,
        }
    }
}

impl Default for FishResultInterpreter {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl std::fmt::Debug for FishResultInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FishResultInterpreter")
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

/// True when no record carries a species (including the empty case).
pub fn no_fish_detected(records: &[IdentificationRecord]) -> bool {
    records.iter().all(|r| r.species.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, score: f32) -> ClassificationEntry {
        ClassificationEntry::new(label, score)
    }

    #[test]
    fn test_tiger_shark_and_towel() {
        let interpreter = FishResultInterpreter::new(5);
        let out = interpreter.interpret(&[entry("tiger shark", 0.92), entry("beach towel", 0.05)]);

        assert_eq!(out.records.len(), 2);
        assert_eq!(
            out.records[0],
            IdentificationRecord {
                label: "tiger shark".to_string(),
                score: 0.92,
                species: Some("tiger shark".to_string()),
                genus: Some("tiger".to_string()),
                common_name: Some("tiger shark".to_string()),
            }
        );
        assert_eq!(
            out.records[1],
            IdentificationRecord::bare(&entry("beach towel", 0.05))
        );
        assert!(!out.no_fish_detected);
    }

    #[test]
    fn test_umbrella_is_no_fish() {
        let out = FishResultInterpreter::default().interpret(&[entry("umbrella", 0.99)]);
        assert_eq!(out.records, vec![IdentificationRecord::bare(&entry("umbrella", 0.99))]);
        assert!(out.no_fish_detected);
    }

    #[test]
    fn test_empty_input() {
        let out = FishResultInterpreter::default().interpret(&[]);
        assert!(out.records.is_empty());
        assert!(out.no_fish_detected);
    }

    #[test]
    fn test_top_k_truncates_from_front() {
        let entries = vec![
            entry("salmon", 0.5),
            entry("rock", 0.2),
            entry("trout", 0.1),
            entry("sand", 0.1),
            entry("tuna", 0.05),
        ];
        let out = FishResultInterpreter::new(2).interpret(&entries);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].label, "salmon");
        assert_eq!(out.records[1].label, "rock");
    }

    #[test]
    fn test_single_token_cod() {
        let out = FishResultInterpreter::default().interpret(&[entry("cod", 0.6)]);
        assert_eq!(out.records[0].genus.as_deref(), Some("cod"));
        assert_eq!(out.records[0].species.as_deref(), Some("cod"));
        assert_eq!(out.records[0].common_name.as_deref(), Some("cod"));
    }

    #[test]
    fn test_unsorted_input_is_not_resorted() {
        let entries = vec![entry("rock", 0.1), entry("bass", 0.9)];
        let out = FishResultInterpreter::default().interpret(&entries);
        assert_eq!(out.records[0].label, "rock");
        assert_eq!(out.records[1].label, "bass");
        assert_eq!(out.records[1].score, 0.9);
    }

    #[test]
    fn test_from_config_uses_keywords() {
        let config = InterpreterConfig {
            top_k: 3,
            keywords: vec!["eel".to_string()],
        };
        let interpreter = FishResultInterpreter::from_config(&config);
        assert_eq!(interpreter.top_k(), 3);
        assert!(interpreter.is_relevant("moray eel"));
        assert!(!interpreter.is_relevant("tiger shark"));
    }

    #[test]
    fn test_with_top_k_shares_strategy() {
        let interpreter = FishResultInterpreter::from_config(&InterpreterConfig {
            top_k: 5,
            keywords: vec!["eel".to_string()],
        });
        let narrowed = interpreter.with_top_k(1);
        assert_eq!(narrowed.top_k(), 1);
        assert!(narrowed.is_relevant("eel"));
    }

    struct EverythingIsFish;

    impl TaxonomyStrategy for EverythingIsFish {
        fn is_relevant(&self, _label: &str) -> bool {
            true
        }

        fn derive(&self, label: &str) -> Option<TaxonomicNames> {
            Some(TaxonomicNames {
                genus: "Pisces".to_string(),
                species: "Pisces incertae".to_string(),
                common_name: label.to_string(),
            })
        }
    }

    #[test]
    fn test_custom_strategy_is_used() {
        let interpreter = FishResultInterpreter::with_strategy(5, Arc::new(EverythingIsFish));
        let out = interpreter.interpret(&[entry("umbrella", 0.99)]);
        assert_eq!(out.records[0].genus.as_deref(), Some("Pisces"));
        assert_eq!(out.records[0].common_name.as_deref(), Some("umbrella"));
        assert!(!out.no_fish_detected);
    }
}
