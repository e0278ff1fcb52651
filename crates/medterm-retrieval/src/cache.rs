use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::work::Work;

/// One JSON file per DOI under the cache directory. Reads are best-effort:
/// a missing or unreadable entry is a miss, never an error. Entries do not
/// expire; `cached_at` is recorded so a TTL could be added later.
pub struct MetadataCache {
    dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct CacheEnvelope {
    data: Work,
    cached_at: DateTime<Utc>,
}

impl MetadataCache {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn entry_path(&self, doi: &str) -> PathBuf {
        self.dir.join(format!("{}.json", doi.replace('/', "_")))
    }

    pub fn get(&self, doi: &str) -> Option<Work> {
        let path = self.entry_path(doi);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::error!("Failed to read cache for {doi}: {e}");
                return None;
            }
        };
        match serde_json::from_str::<CacheEnvelope>(&contents) {
            Ok(envelope) => Some(envelope.data),
            Err(e) => {
                tracing::error!("Failed to parse cache entry for {doi}: {e}");
                None
            }
        }
    }

    /// Best-effort write; a failure is logged and the caller proceeds with
    /// the uncached work.
    pub fn put(&self, doi: &str, work: &Work) {
        let envelope = CacheEnvelope {
            data: work.clone(),
            cached_at: Utc::now(),
        };
        let result = serde_json::to_string_pretty(&envelope)
            .map_err(io::Error::other)
            .and_then(|json| fs::write(self.entry_path(doi), json));
        if let Err(e) = result {
            tracing::error!("Failed to cache paper {doi}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_work() -> Work {
        serde_json::from_str(r#"{"DOI": "10.1000/demo.1", "title": ["A Study"]}"#).unwrap()
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::new(dir.path().join("cache")).unwrap();

        cache.put("10.1000/demo.1", &sample_work());
        let cached = cache.get("10.1000/demo.1").unwrap();
        assert_eq!(cached.doi.as_deref(), Some("10.1000/demo.1"));
        assert_eq!(cached.title, ["A Study"]);
    }

    #[test]
    fn slashes_in_dois_map_to_flat_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::new(dir.path()).unwrap();

        cache.put("10.1000/demo.1", &sample_work());
        assert!(dir.path().join("10.1000_demo.1.json").exists());
    }

    #[test]
    fn unknown_doi_and_corrupt_entry_are_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::new(dir.path()).unwrap();

        assert!(cache.get("10.1000/absent").is_none());

        fs::write(dir.path().join("10.1000_bad.json"), "{ not json").unwrap();
        assert!(cache.get("10.1000/bad").is_none());
    }
}
