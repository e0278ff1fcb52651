//! Typed view over CrossRef work metadata.
//!
//! Only the fields the summary needs are typed; everything else the API
//! returns is retained in `extra` so caching a work loses nothing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Work {
    #[serde(rename = "DOI", default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<Author>,
    #[serde(rename = "container-title", default, skip_serializing_if = "Vec::is_empty")]
    pub container_title: Vec<String>,
    #[serde(rename = "published-print", default, skip_serializing_if = "Option::is_none")]
    pub published_print: Option<DateParts>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub work_abstract: Option<String>,
    /// Reference list attached by
    /// [`PaperRetrieval::get_paper_with_references`](crate::PaperRetrieval::get_paper_with_references).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateParts {
    #[serde(rename = "date-parts", default)]
    pub date_parts: Vec<Vec<Option<i32>>>,
}

/// The fields callers actually display, flattened out of the nested arrays.
#[derive(Debug, Clone, Serialize)]
pub struct WorkSummary {
    pub doi: Option<String>,
    pub title: Option<String>,
    pub authors: Vec<Author>,
    pub published: Option<i32>,
    pub journal: Option<String>,
    pub work_type: Option<String>,
    pub work_abstract: Option<String>,
}

impl WorkSummary {
    pub fn from_work(work: &Work) -> Self {
        Self {
            doi: work.doi.clone(),
            title: work.title.first().cloned(),
            authors: work.author.clone(),
            published: work
                .published_print
                .as_ref()
                .and_then(|p| p.date_parts.first())
                .and_then(|parts| parts.first().copied())
                .flatten(),
            journal: work.container_title.first().cloned(),
            work_type: work.work_type.clone(),
            work_abstract: work.work_abstract.clone(),
        }
    }
}
