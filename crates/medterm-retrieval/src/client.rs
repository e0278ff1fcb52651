use reqwest::StatusCode;
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::work::Work;
use crate::{MetadataSource, RetrievalError};

pub const CROSSREF_API: &str = "https://api.crossref.org";

/// CrossRef REST client. The mailto address goes into the User-Agent header
/// for CrossRef's polite pool.
#[derive(Clone)]
pub struct CrossrefClient {
    base_url: String,
    client: reqwest::Client,
    mailto: String,
}

#[derive(Deserialize)]
struct MessageEnvelope<T> {
    message: T,
}

#[derive(Deserialize)]
struct ItemList {
    #[serde(default)]
    items: Vec<Work>,
}

impl CrossrefClient {
    pub fn new(mailto: impl Into<String>) -> Self {
        Self::with_base_url(CROSSREF_API, mailto)
    }

    pub fn with_base_url(base_url: impl Into<String>, mailto: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            mailto: mailto.into(),
        }
    }

    fn user_agent(&self) -> String {
        format!("medterm/0.1 (mailto:{})", self.mailto)
    }

    /// Work metadata for a DOI. `Ok(None)` when CrossRef does not know the
    /// DOI; any other non-success status is an error.
    pub async fn work_by_doi(&self, doi: &str) -> Result<Option<Work>, RetrievalError> {
        let url = format!("{}/works/{}", self.base_url, encode_doi(doi));
        tracing::info!("Fetching DOI: {doi}");
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, self.user_agent())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let envelope: MessageEnvelope<Work> = response.json().await?;
                Ok(Some(envelope.message))
            }
            StatusCode::NOT_FOUND => {
                tracing::warn!("DOI not found: {doi}");
                Ok(None)
            }
            status => {
                tracing::error!("Error fetching DOI {doi}: {status}");
                Err(RetrievalError::Status(status))
            }
        }
    }

    /// Free-text search over works.
    pub async fn search_works(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Work>, RetrievalError> {
        let url = format!("{}/works", self.base_url);
        tracing::info!("Searching works with query: {query}");
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, self.user_agent())
            .query(&[
                ("query", query),
                ("rows", &limit.to_string()),
                ("offset", &offset.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Search failed with status: {status}");
            return Err(RetrievalError::Status(status));
        }
        let envelope: MessageEnvelope<ItemList> = response.json().await?;
        Ok(envelope.message.items)
    }

    /// Reference list for a DOI, passed through untyped. `Ok(None)` when the
    /// work has no reference data.
    pub async fn references_by_doi(
        &self,
        doi: &str,
    ) -> Result<Option<serde_json::Value>, RetrievalError> {
        let url = format!("{}/works/{}/references", self.base_url, encode_doi(doi));
        tracing::info!("Fetching references for DOI: {doi}");
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, self.user_agent())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let envelope: MessageEnvelope<serde_json::Value> = response.json().await?;
                Ok(Some(envelope.message))
            }
            StatusCode::NOT_FOUND => {
                tracing::warn!("References not found for DOI: {doi}");
                Ok(None)
            }
            status => {
                tracing::error!("Error fetching references for DOI {doi}: {status}");
                Err(RetrievalError::Status(status))
            }
        }
    }
}

#[async_trait::async_trait]
impl MetadataSource for CrossrefClient {
    async fn work_by_doi(&self, doi: &str) -> Result<Option<Work>, RetrievalError> {
        CrossrefClient::work_by_doi(self, doi).await
    }

    async fn search_works(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Work>, RetrievalError> {
        CrossrefClient::search_works(self, query, limit, offset).await
    }

    async fn references_by_doi(
        &self,
        doi: &str,
    ) -> Result<Option<serde_json::Value>, RetrievalError> {
        CrossrefClient::references_by_doi(self, doi).await
    }
}

/// Percent-encodes a DOI for use as a path segment, keeping `/` literal the
/// way CrossRef expects.
fn encode_doi(doi: &str) -> String {
    let mut encoded = String::with_capacity(doi.len());
    for byte in doi.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                encoded.push(byte as char);
            }
            _ => {
                encoded.push('%');
                encoded.push_str(&format!("{byte:02X}"));
            }
        }
    }
    encoded
}
