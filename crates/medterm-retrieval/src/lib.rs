//! Bibliographic metadata retrieval: a CrossRef client behind a trait seam,
//! fronted by an on-disk response cache.

pub mod cache;
pub mod client;
pub mod work;

pub use cache::MetadataCache;
pub use client::CrossrefClient;
pub use work::{Author, Work, WorkSummary};

/// Transport and protocol failures surface to the caller; a missing work is
/// `Ok(None)`, not an error.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("cache I/O error: {0}")]
    CacheIo(#[from] std::io::Error),
}

/// Where work metadata comes from. Lets the cache-first layer be exercised
/// without a network.
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    async fn work_by_doi(&self, doi: &str) -> Result<Option<Work>, RetrievalError>;

    async fn search_works(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Work>, RetrievalError>;

    async fn references_by_doi(
        &self,
        doi: &str,
    ) -> Result<Option<serde_json::Value>, RetrievalError>;
}

/// Cache-first paper retrieval over any [`MetadataSource`].
pub struct PaperRetrieval<S = CrossrefClient> {
    source: S,
    cache: MetadataCache,
}

impl<S: MetadataSource> PaperRetrieval<S> {
    pub fn new(source: S, cache: MetadataCache) -> Self {
        Self { source, cache }
    }

    /// Work metadata for a DOI, served from the cache when allowed and
    /// present; a fresh fetch is cached before returning.
    pub async fn get_paper(
        &self,
        doi: &str,
        use_cache: bool,
    ) -> Result<Option<Work>, RetrievalError> {
        if use_cache {
            if let Some(cached) = self.cache.get(doi) {
                tracing::info!("Retrieved paper {doi} from cache");
                return Ok(Some(cached));
            }
        }
        match self.source.work_by_doi(doi).await? {
            Some(work) => {
                self.cache.put(doi, &work);
                Ok(Some(work))
            }
            None => Ok(None),
        }
    }

    /// Like [`Self::get_paper`], additionally attaching the reference list
    /// when the source has one and re-caching the enriched work.
    pub async fn get_paper_with_references(
        &self,
        doi: &str,
        use_cache: bool,
    ) -> Result<Option<Work>, RetrievalError> {
        let Some(mut work) = self.get_paper(doi, use_cache).await? else {
            return Ok(None);
        };
        if work.references.is_none() {
            if let Some(references) = self.source.references_by_doi(doi).await? {
                work.references = Some(references);
                self.cache.put(doi, &work);
            }
        }
        Ok(Some(work))
    }

    pub async fn search_papers(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Work>, RetrievalError> {
        self.source.search_works(query, limit, 0).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Canned source that counts how often the network would be hit.
    struct StubSource {
        work: Option<Work>,
        fetches: AtomicUsize,
    }

    impl StubSource {
        fn with_work(json: &str) -> Self {
            Self {
                work: Some(serde_json::from_str(json).unwrap()),
                fetches: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self { work: None, fetches: AtomicUsize::new(0) }
        }
    }

    #[async_trait::async_trait]
    impl MetadataSource for StubSource {
        async fn work_by_doi(&self, _doi: &str) -> Result<Option<Work>, RetrievalError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.work.clone())
        }

        async fn search_works(
            &self,
            _query: &str,
            _limit: usize,
            _offset: usize,
        ) -> Result<Vec<Work>, RetrievalError> {
            Ok(self.work.clone().into_iter().collect())
        }

        async fn references_by_doi(
            &self,
            _doi: &str,
        ) -> Result<Option<serde_json::Value>, RetrievalError> {
            Ok(Some(serde_json::json!([{"key": "ref1"}])))
        }
    }

    fn retrieval(source: StubSource, dir: &tempfile::TempDir) -> PaperRetrieval<StubSource> {
        PaperRetrieval::new(source, MetadataCache::new(dir.path().join("cache")).unwrap())
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let papers = retrieval(
            StubSource::with_work(r#"{"DOI": "10.1000/demo.1", "title": ["A Study"]}"#),
            &dir,
        );

        let first = papers.get_paper("10.1000/demo.1", true).await.unwrap().unwrap();
        let second = papers.get_paper("10.1000/demo.1", true).await.unwrap().unwrap();
        assert_eq!(first.title, second.title);
        assert_eq!(papers.source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_bypass_always_hits_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let papers = retrieval(
            StubSource::with_work(r#"{"DOI": "10.1000/demo.1"}"#),
            &dir,
        );

        papers.get_paper("10.1000/demo.1", false).await.unwrap();
        papers.get_paper("10.1000/demo.1", false).await.unwrap();
        assert_eq!(papers.source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_doi_is_none_and_never_cached() {
        let dir = tempfile::tempdir().unwrap();
        let papers = retrieval(StubSource::empty(), &dir);

        assert!(papers.get_paper("10.1000/absent", true).await.unwrap().is_none());
        assert!(papers.cache.get("10.1000/absent").is_none());
    }

    #[tokio::test]
    async fn references_are_attached_and_recached() {
        let dir = tempfile::tempdir().unwrap();
        let papers = retrieval(
            StubSource::with_work(r#"{"DOI": "10.1000/demo.1"}"#),
            &dir,
        );

        let work = papers
            .get_paper_with_references("10.1000/demo.1", true)
            .await
            .unwrap()
            .unwrap();
        assert!(work.references.is_some());

        let cached = papers.cache.get("10.1000/demo.1").unwrap();
        assert!(cached.references.is_some());
    }
}
