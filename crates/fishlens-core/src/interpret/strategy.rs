//! Taxonomy strategies: deciding whether a label names a fish and deriving
//! genus/species strings from it.

/// Keywords whose presence (as a substring) marks a label as fish-relevant.
pub const DEFAULT_FISH_KEYWORDS: &[&str] = &[
    "fish", "salmon", "tuna", "bass", "shark", "trout", "cod", "marine", "aquatic",
];

/// Names derived from a fish-relevant label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomicNames {
    pub genus: String,
    pub species: String,
    pub common_name: String,
}

/// Pluggable relevance + name-derivation strategy.
///
/// A real taxonomy lookup can replace [`KeywordHeuristic`] without touching
/// the interpreter.
pub trait TaxonomyStrategy: Send + Sync {
    /// Whether the label plausibly refers to a fish taxon.
    fn is_relevant(&self, label: &str) -> bool;

    /// Names for a label. Returns `None` when the label is not relevant.
    fn derive(&self, label: &str) -> Option<TaxonomicNames>;
}

/// Substring keyword matching with whitespace-token name slicing.
///
/// Matching is a plain case-insensitive `contains` per keyword: no stemming
/// and no word boundaries, so "catfishery" matches "fish".
#[derive(Debug, Clone)]
pub struct KeywordHeuristic {
    keywords: Vec<String>,
}

impl KeywordHeuristic {
    /// Build a heuristic from keywords. Keywords are lower-cased; blank
    /// entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordHeuristic {
    fn default() -> Self {
        Self::new(DEFAULT_FISH_KEYWORDS)
    }
}

impl TaxonomyStrategy for KeywordHeuristic {
    fn is_relevant(&self, label: &str) -> bool {
        let lower = label.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    fn derive(&self, label: &str) -> Option<TaxonomicNames> {
        if !self.is_relevant(label) {
            return None;
        }

        let mut tokens = label.split_whitespace();
        let first = tokens.next();
        let second = tokens.next();

        // A relevant label always contains a keyword, so it has at least one token.
        let genus = first.unwrap_or(label).to_string();
        let species = match (first, second) {
            (Some(a), Some(b)) => format!("{a} {b}"),
            _ => label.to_string(),
        };

        Some(TaxonomicNames {
            genus,
            species,
            common_name: label.to_string(),
        })
    }
}
