//! The durable term store.
//!
//! A `BTreeMap` of normalized English keys to [`TermRecord`]s, mirrored to a
//! single JSON document on every mutation. Single-process, single-writer:
//! each mutating call rewrites the whole backing file, so concurrent writers
//! sharing one file would clobber each other.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;

use crate::csv;
use crate::error::{LoadStatus, StoreError};
use crate::record::{TermRecord, normalize_key, normalize_text};
use crate::similarity;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_SOURCE: &str = "manual";
pub const IMPORT_SOURCE: &str = "import";

const CSV_HEADER: [&str; 5] = ["English", "Vietnamese", "Category", "Confidence", "Last Updated"];

pub struct TermStore {
    path: PathBuf,
    terms: BTreeMap<String, TermRecord>,
    load_status: LoadStatus,
}

/// Outcome of a CSV import batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

impl TermStore {
    /// Opens the store backed by `path`.
    ///
    /// A missing file is a valid empty store. A corrupt or unreadable file
    /// also yields an empty store, but with [`LoadStatus::Corrupt`] so the
    /// caller can alert before the next save overwrites it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (terms, load_status) = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, TermRecord>>(&contents) {
                Ok(terms) => {
                    tracing::info!("Loaded {} terms from {}", terms.len(), path.display());
                    let count = terms.len();
                    (terms, LoadStatus::Loaded(count))
                }
                Err(e) => {
                    tracing::warn!("Store file {} is corrupt, starting empty: {e}", path.display());
                    (BTreeMap::new(), LoadStatus::Corrupt)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No store at {}, starting empty", path.display());
                (BTreeMap::new(), LoadStatus::Missing)
            }
            Err(e) => {
                tracing::warn!("Store file {} is unreadable, starting empty: {e}", path.display());
                (BTreeMap::new(), LoadStatus::Corrupt)
            }
        };
        Self { path, terms, load_status }
    }

    pub fn load_status(&self) -> LoadStatus {
        self.load_status
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// All keys, in store iteration order (sorted).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermRecord)> {
        self.terms.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Create-or-overwrite. Any existing record for the same normalized key
    /// is replaced and its version history discarded; the new record starts
    /// with exactly one version entry. Contrast with [`Self::append_version`].
    pub fn upsert(
        &mut self,
        english: &str,
        vietnamese: &str,
        category: &str,
        source: &str,
        confidence: f64,
    ) -> Result<(), StoreError> {
        check_confidence(confidence)?;
        let key = normalize_key(english);
        let record = TermRecord::new(normalize_text(vietnamese), category, source, confidence, Utc::now());
        self.terms.insert(key.clone(), record);
        self.save()?;
        tracing::info!("Added term: {key}");
        Ok(())
    }

    /// Appends a new version to an existing record, refreshing the current
    /// fields and `last_updated`. Returns `Ok(false)` when the key is absent;
    /// no record is created.
    ///
    /// On a failed save the in-memory change has still been applied and an
    /// error is returned; the next successful save reconciles the file.
    pub fn append_version(
        &mut self,
        english: &str,
        vietnamese: &str,
        source: &str,
        confidence: f64,
    ) -> Result<bool, StoreError> {
        check_confidence(confidence)?;
        let key = normalize_key(english);
        let Some(record) = self.terms.get_mut(&key) else {
            tracing::warn!("Term not found: {key}");
            return Ok(false);
        };
        record.push_version(normalize_text(vietnamese), source, confidence, Utc::now());
        self.save()?;
        tracing::info!("Updated term: {key}");
        Ok(true)
    }

    /// Looks up a record by normalized key. Absence is a normal outcome.
    pub fn get(&self, english: &str) -> Option<&TermRecord> {
        self.terms.get(&normalize_key(english))
    }

    /// Ranks stored keys by similarity to `term`; see [`similarity::rank`].
    pub fn similar_terms(&self, term: &str, limit: usize) -> Vec<(String, f64)> {
        similarity::rank(term, self.terms.keys().map(String::as_str), limit)
    }

    /// Writes every record as one CSV row, in store iteration order.
    pub fn export_csv(&self, path: &Path) -> Result<(), StoreError> {
        let mut out = csv::format_row(&CSV_HEADER);
        for (key, record) in &self.terms {
            out.push_str(&csv::format_row(&[
                key,
                &record.vietnamese,
                &record.category,
                &record.confidence.to_string(),
                &record.last_updated.to_rfc3339(),
            ]));
        }
        fs::write(path, out)?;
        tracing::info!("Exported {} terms to {}", self.terms.len(), path.display());
        Ok(())
    }

    /// Imports rows of the export format, routing each through [`Self::upsert`]
    /// (so import inherits its overwrite contract). Category defaults to
    /// "general" and an absent or unparseable Confidence to 1.0; a row missing
    /// its key or translation, or carrying an out-of-range confidence, is
    /// logged and skipped without aborting the batch.
    pub fn import_csv(&mut self, path: &Path, source: &str) -> Result<ImportSummary, StoreError> {
        let contents = fs::read_to_string(path)?;
        let mut rows = csv::parse_records(&contents).into_iter();

        let header = rows.next().unwrap_or_default();
        let column = |name: &'static str| -> Option<usize> {
            header.iter().position(|h| h.trim() == name)
        };
        let english_col = column("English").ok_or(StoreError::MissingColumn("English"))?;
        let vietnamese_col = column("Vietnamese").ok_or(StoreError::MissingColumn("Vietnamese"))?;
        let category_col = column("Category");
        let confidence_col = column("Confidence");

        let mut summary = ImportSummary::default();
        for (line, row) in rows.enumerate() {
            let english = row.get(english_col).map(String::as_str).unwrap_or("");
            let vietnamese = row.get(vietnamese_col).map(String::as_str).unwrap_or("");
            if english.trim().is_empty() || vietnamese.trim().is_empty() {
                tracing::warn!("Skipping row {}: missing term or translation", line + 2);
                summary.skipped += 1;
                continue;
            }
            let category = category_col
                .and_then(|c| row.get(c))
                .map(String::as_str)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_CATEGORY);
            let confidence = confidence_col
                .and_then(|c| row.get(c))
                .and_then(|c| c.trim().parse::<f64>().ok())
                .unwrap_or(1.0);

            match self.upsert(english, vietnamese, category, source, confidence) {
                Ok(()) => summary.imported += 1,
                Err(StoreError::ConfidenceRange(value)) => {
                    tracing::warn!("Skipping row {}: confidence {value} outside [0, 1]", line + 2);
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(
            "Imported {} terms from {} ({} skipped)",
            summary.imported,
            path.display(),
            summary.skipped
        );
        Ok(summary)
    }

    /// Serializes the whole map to the backing file, write-temp-then-rename
    /// so a crash mid-write cannot leave a half-written store.
    fn save(&self) -> Result<(), StoreError> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let tmp = NamedTempFile::new_in(parent)?;
        let mut writer = BufWriter::new(&tmp);
        serde_json::to_writer_pretty(&mut writer, &self.terms)?;
        writer.flush()?;
        drop(writer);
        tmp.persist(&self.path)?;
        Ok(())
    }
}

fn check_confidence(confidence: f64) -> Result<(), StoreError> {
    if (0.0..=1.0).contains(&confidence) {
        Ok(())
    } else {
        Err(StoreError::ConfidenceRange(confidence))
    }
}
