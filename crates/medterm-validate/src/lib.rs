//! Translation-quality validation against the term store.

use medterm_core::TermStore;
use serde::Serialize;

pub mod checks;

/// How many related terms to attach to a verdict.
pub const RELATED_TERM_LIMIT: usize = 5;

const DICTIONARY_DISCOUNT: f64 = 0.7;
const DIACRITICS_DISCOUNT: f64 = 0.8;
const FORMATTING_DISCOUNT: f64 = 0.9;

/// A stored term textually close to the one under validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedTerm {
    pub english: String,
    pub vietnamese: String,
    pub similarity: f64,
}

/// Structured verdict on a proposed translation pair.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub confidence: f64,
    pub suggestions: Vec<String>,
    pub related: Vec<RelatedTerm>,
}

/// Judges proposed (english, vietnamese) pairs against dictionary content
/// and the formatting/diacritic rules in [`checks`].
pub struct Validator<'a> {
    store: &'a TermStore,
}

impl<'a> Validator<'a> {
    pub fn new(store: &'a TermStore) -> Self {
        Self { store }
    }

    /// Runs all three checks (never short-circuiting) and enriches the
    /// verdict with related terms regardless of the outcome. Each failed
    /// check flips `valid` and multiplicatively discounts `confidence`.
    pub fn validate(&self, english: &str, vietnamese: &str) -> ValidationReport {
        let mut report = ValidationReport {
            valid: true,
            issues: Vec::new(),
            confidence: 1.0,
            suggestions: Vec::new(),
            related: Vec::new(),
        };

        if let Some(stored) = checks::established_conflict(self.store, english, vietnamese) {
            report.valid = false;
            report.issues.push("Translation differs from dictionary".to_string());
            report.suggestions.push(stored);
            report.confidence *= DICTIONARY_DISCOUNT;
        }
        if checks::missing_diacritics(vietnamese) {
            report.valid = false;
            report.issues.push("Missing diacritical marks".to_string());
            report.confidence *= DIACRITICS_DISCOUNT;
        }
        if !checks::well_formatted(vietnamese) {
            report.valid = false;
            report.issues.push("Incorrect formatting".to_string());
            report.confidence *= FORMATTING_DISCOUNT;
        }

        for (term, similarity) in self.store.similar_terms(english, RELATED_TERM_LIMIT) {
            if let Some(record) = self.store.get(&term) {
                report.related.push(RelatedTerm {
                    english: term,
                    vietnamese: record.vietnamese.clone(),
                    similarity,
                });
            }
        }

        tracing::debug!(
            "Validated '{english}': valid={}, {} issue(s)",
            report.valid,
            report.issues.len()
        );
        report
    }

    /// Advisory prose derived from the same three checks, plus up to three
    /// related-term reference lines.
    pub fn suggest_improvements(&self, english: &str, vietnamese: &str) -> Vec<String> {
        let mut suggestions = Vec::new();

        if let Some(stored) = checks::established_conflict(self.store, english, vietnamese) {
            suggestions.push(format!("Consider using established translation: {stored}"));
        }
        if checks::missing_diacritics(vietnamese) {
            suggestions.push("Add appropriate diacritical marks to Vietnamese text".to_string());
        }
        if !checks::well_formatted(vietnamese) {
            suggestions.push("Fix formatting issues (whitespace, special characters)".to_string());
        }

        let related = self.store.similar_terms(english, RELATED_TERM_LIMIT);
        if !related.is_empty() {
            suggestions.push("Related terms for reference:".to_string());
            for (term, _) in related.iter().take(3) {
                if let Some(record) = self.store.get(term) {
                    suggestions.push(format!("- {term}: {}", record.vietnamese));
                }
            }
        }
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store(dir: &tempfile::TempDir) -> TermStore {
        let mut store = TermStore::open(dir.path().join("terms.json"));
        store.upsert("fever", "sốt", "symptom", "manual", 1.0).unwrap();
        store.upsert("headache", "đau đầu", "symptom", "manual", 1.0).unwrap();
        store
    }

    #[test]
    fn conflicting_translation_is_invalid_with_suggestion() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(&dir);
        let report = Validator::new(&store).validate("fever", "sot");

        assert!(!report.valid);
        assert!(report.issues.iter().any(|i| i == "Translation differs from dictionary"));
        assert!(report.suggestions.iter().any(|s| s == "sốt"));
        assert!(report.confidence < 1.0);
    }

    #[test]
    fn matching_translation_is_valid_at_full_confidence() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(&dir);
        let report = Validator::new(&store).validate("fever", "Sốt");

        assert!(report.valid);
        assert!(report.issues.is_empty());
        assert_eq!(report.confidence, 1.0);
    }

    #[test]
    fn all_checks_run_and_discounts_compound() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(&dir);
        // differs from "sốt", bare base letter, double space
        let report = Validator::new(&store).validate("fever", "đau  nhe");

        assert!(!report.valid);
        assert_eq!(report.issues.len(), 3);
        assert!((report.confidence - 0.7 * 0.8 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn double_space_fails_only_the_formatting_check() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(&dir);
        let report = Validator::new(&store).validate("unknown term", "double  space");

        assert!(!report.valid);
        assert_eq!(report.issues, ["Incorrect formatting"]);
    }

    #[test]
    fn unknown_term_with_clean_text_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(&dir);
        let report = Validator::new(&store).validate("unknown term", "normal text");

        assert!(report.valid);
        assert_eq!(report.confidence, 1.0);
    }

    #[test]
    fn related_terms_attach_regardless_of_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(&dir);
        let validator = Validator::new(&store);

        let valid = validator.validate("fever", "sốt");
        assert!(valid.related.iter().any(|r| r.english == "fever" && r.vietnamese == "sốt"));

        let invalid = validator.validate("fever", "sot");
        assert!(!invalid.related.is_empty());
    }

    #[test]
    fn suggestions_cover_all_failing_checks() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(&dir);
        let lines = Validator::new(&store).suggest_improvements("fever", "sot");

        assert!(lines.iter().any(|l| l == "Consider using established translation: sốt"));
        assert!(lines.iter().any(|l| l == "Related terms for reference:"));
        assert!(lines.iter().any(|l| l.starts_with("- fever:")));
    }
}
