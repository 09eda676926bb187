//! Controlled vocabulary of admitted topic labels
//!
//! Grows monotonically during a build — a topic once admitted is never
//! removed — and is serialized into every extraction prompt so the oracle
//! reuses existing names instead of minting near-duplicate synonyms.

use crate::graph::sanitize::{canonical_key, sanitize};
use std::collections::BTreeMap;

/// The set of topic labels already admitted into the graph.
///
/// Keyed by canonical label so case variants collapse; the stored value is
/// the first-admitted display form, which is what the prompt shows.
#[derive(Debug, Clone, Default)]
pub struct ControlledVocabulary {
    topics: BTreeMap<String, String>,
}

impl ControlledVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known topic set — deterministic tests inject one.
    pub fn seeded<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::new();
        for topic in topics {
            vocabulary.admit(topic.as_ref());
        }
        vocabulary
    }

    /// Admit a topic label. Returns true if it was new.
    pub fn admit(&mut self, label: &str) -> bool {
        let key = canonical_key(label);
        if key.is_empty() {
            return false;
        }
        if self.topics.contains_key(&key) {
            return false;
        }
        self.topics
            .insert(key, sanitize(label).trim().to_string());
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.topics.contains_key(&canonical_key(label))
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// The deterministic prompt rendering: topics sorted by canonical key,
    /// quoted, comma-joined; `"None"` when nothing has been admitted yet.
    /// Sorting keeps the prompt stable run-to-run for caching and tests.
    pub fn prompt_snapshot(&self) -> String {
        if self.topics.is_empty() {
            return "None".to_string();
        }
        self.topics
            .values()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vocabulary_renders_as_none() {
        assert_eq!(ControlledVocabulary::new().prompt_snapshot(), "None");
    }

    #[test]
    fn snapshot_is_sorted_and_quoted() {
        let vocabulary =
            ControlledVocabulary::seeded(["volatility modeling", "algorithmic trading"]);
        assert_eq!(
            vocabulary.prompt_snapshot(),
            r#""algorithmic trading", "volatility modeling""#
        );
    }

    #[test]
    fn admit_is_monotonic_and_deduplicates() {
        let mut vocabulary = ControlledVocabulary::new();
        assert!(vocabulary.admit("Risk Management"));
        assert!(!vocabulary.admit("risk management"));
        assert!(!vocabulary.admit("  RISK MANAGEMENT "));
        assert_eq!(vocabulary.len(), 1);
        assert!(vocabulary.contains("risk MANAGEMENT"));
        // first-admitted display form is what the prompt shows
        assert_eq!(vocabulary.prompt_snapshot(), r#""Risk Management""#);
    }

    #[test]
    fn blank_labels_are_not_admitted() {
        let mut vocabulary = ControlledVocabulary::new();
        assert!(!vocabulary.admit("   "));
        assert!(!vocabulary.admit("\u{0}\u{1}"));
        assert!(vocabulary.is_empty());
    }
}
