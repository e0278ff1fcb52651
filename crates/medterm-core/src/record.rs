use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Normalized store key: NFC, trimmed, lower-cased.
///
/// Two surface strings that normalize to the same key refer to the same
/// record.
pub fn normalize_key(raw: &str) -> String {
    raw.nfc().collect::<String>().trim().to_lowercase()
}

/// NFC-normalized, trimmed translation text.
pub fn normalize_text(raw: &str) -> String {
    raw.nfc().collect::<String>().trim().to_string()
}

/// One immutable snapshot in a term's translation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub vietnamese: String,
    pub confidence: f64,
    pub date: DateTime<Utc>,
    pub source: String,
}

/// A stored term: append-only version history plus denormalized current
/// fields, which always mirror the last version entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    pub vietnamese: String,
    pub category: String,
    pub source: String,
    pub confidence: f64,
    pub added_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub versions: Vec<VersionEntry>,
}

impl TermRecord {
    pub(crate) fn new(
        vietnamese: String,
        category: &str,
        source: &str,
        confidence: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            versions: vec![VersionEntry {
                vietnamese: vietnamese.clone(),
                confidence,
                date: now,
                source: source.to_string(),
            }],
            vietnamese,
            category: category.to_string(),
            source: source.to_string(),
            confidence,
            added_date: now,
            last_updated: now,
        }
    }

    /// Appends a snapshot and mirrors it into the current fields.
    /// Timestamps never run backwards within a record.
    pub(crate) fn push_version(
        &mut self,
        vietnamese: String,
        source: &str,
        confidence: f64,
        now: DateTime<Utc>,
    ) {
        let date = now.max(self.last_updated);
        self.versions.push(VersionEntry {
            vietnamese: vietnamese.clone(),
            confidence,
            date,
            source: source.to_string(),
        });
        self.vietnamese = vietnamese;
        self.source = source.to_string();
        self.confidence = confidence;
        self.last_updated = date;
    }

    /// The most recent version entry. Every record has at least one.
    pub fn current_version(&self) -> &VersionEntry {
        self.versions.last().expect("record has at least one version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_normalization_folds_case_and_whitespace() {
        assert_eq!(normalize_key("  Heart Attack "), "heart attack");
        assert_eq!(normalize_key("FEVER"), normalize_key("fever"));
    }

    #[test]
    fn key_normalization_unifies_composed_forms() {
        // "sốt" written precomposed vs. with combining marks
        let composed = "s\u{1ED1}t";
        let decomposed = "so\u{0302}\u{0301}t";
        assert_eq!(normalize_key(composed), normalize_key(decomposed));
    }

    #[test]
    fn push_version_keeps_current_fields_in_sync() {
        let t0 = Utc::now();
        let mut record = TermRecord::new("sốt".to_string(), "general", "manual", 1.0, t0);
        record.push_version("sốt cao".to_string(), "review", 0.9, Utc::now());

        assert_eq!(record.versions.len(), 2);
        assert_eq!(record.vietnamese, "sốt cao");
        assert_eq!(record.confidence, 0.9);
        assert_eq!(record.source, "review");
        assert_eq!(record.added_date, t0);
        assert_eq!(record.current_version().vietnamese, "sốt cao");
        assert!(record.last_updated >= record.added_date);
    }
}
