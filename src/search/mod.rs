//! Literature search across public classical-text sites.
//!
//! Every source is queried concurrently; a failing source is logged and
//! skipped so the others still return cards.

mod ctext;
mod wikisource;

pub use ctext::{extract_passages, snippet_around, CtextSource};
pub use wikisource::WikisourceSource;

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::http_client::HttpClient;

/// Minimum query length in characters, after trimming.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("请输入至少2个字的搜索内容")]
    QueryTooShort,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One result card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub source: String,
    pub chapter: String,
    /// Display string such as `85%`.
    pub confidence: String,
    pub preview: String,
    pub url: String,
}

impl SearchResult {
    /// Card shown when no source found anything.
    pub fn no_match() -> Self {
        Self {
            title: "未找到直接匹配".to_string(),
            source: "建议".to_string(),
            chapter: String::new(),
            confidence: "0%".to_string(),
            preview: "建议：1. 尝试更短的关键词 2. 检查是否是繁体字 3. 手动访问 ctext.org 或 guoxuedashi.net 搜索".to_string(),
            url: "https://ctext.org/".to_string(),
        }
    }
}

/// Search section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// ctext.org base URL.
    pub ctext_url: String,
    /// Chinese Wikisource base URL.
    pub wikisource_url: String,
    /// Maximum cards per source.
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            ctext_url: "https://ctext.org".to_string(),
            wikisource_url: "https://zh.wikisource.org".to_string(),
            limit: 3,
        }
    }
}

/// A site that can be searched for passages.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Search for `query`, which has already been validated.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

/// Trim and check the query length.
pub fn validate_query(query: &str) -> Result<&str, SearchError> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(SearchError::QueryTooShort);
    }
    Ok(query)
}

/// Fan-out search over all configured sources.
pub struct LiteratureSearch {
    sources: Vec<Box<dyn LiteratureSource>>,
}

impl LiteratureSearch {
    /// Build the ctext and Wikisource sources.
    ///
    /// ctext gets its own client with a browser user agent; Wikisource
    /// shares `http`.
    pub fn new(
        config: &SearchConfig,
        http: &HttpClient,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let browser = HttpClient::new(timeout, Some("impersonate"))?;
        Ok(Self::with_sources(vec![
            Box::new(CtextSource::new(&config.ctext_url, config.limit, browser)),
            Box::new(WikisourceSource::new(
                &config.wikisource_url,
                config.limit,
                http.clone(),
            )),
        ]))
    }

    pub fn with_sources(sources: Vec<Box<dyn LiteratureSource>>) -> Self {
        Self { sources }
    }

    /// Validate, query every source concurrently, and merge in source order.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let query = validate_query(query)?;

        let outcomes = join_all(self.sources.iter().map(|source| source.search(query))).await;

        let mut results = Vec::new();
        for (source, outcome) in self.sources.iter().zip(outcomes) {
            match outcome {
                Ok(cards) => results.extend(cards),
                Err(e) => warn!("{} search failed: {}", source.name(), e),
            }
        }

        if results.is_empty() {
            results.push(SearchResult::no_match());
        }

        info!("Search '{}': {} results", query, results.len());
        Ok(results)
    }
}
