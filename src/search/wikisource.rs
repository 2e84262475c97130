//! Chinese Wikisource via the MediaWiki opensearch API.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{LiteratureSource, SearchError, SearchResult};
use crate::http_client::HttpClient;

pub struct WikisourceSource {
    base_url: String,
    limit: usize,
    http: HttpClient,
}

impl WikisourceSource {
    pub fn new(base_url: &str, limit: usize, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
            http,
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/w/api.php?action=opensearch&format=json&search={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            self.limit
        )
    }
}

/// Turn an opensearch `[query, titles, descriptions, urls]` array into cards.
fn parse_opensearch(body: &Value) -> Result<Vec<SearchResult>, SearchError> {
    let array = body
        .as_array()
        .ok_or_else(|| SearchError::Parse("opensearch response is not an array".to_string()))?;

    let strings = |index: usize| -> Vec<&str> {
        array
            .get(index)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    };
    let titles = strings(1);
    let urls = strings(3);

    Ok(titles
        .iter()
        .enumerate()
        .map(|(i, title)| SearchResult {
            title: title.to_string(),
            source: "维基文库".to_string(),
            chapter: "全文".to_string(),
            confidence: "78%".to_string(),
            preview: format!("找到相关条目：{}", title),
            url: urls.get(i).map(|u| u.to_string()).unwrap_or_default(),
        })
        .collect())
}

#[async_trait]
impl LiteratureSource for WikisourceSource {
    fn name(&self) -> &str {
        "wikisource"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let url = self.search_url(query);
        debug!("Wikisource search: {}", query);

        let response = self.http.get(&url, &HashMap::new()).await?;
        if !response.is_success() {
            return Err(SearchError::Unavailable(format!(
                "Wikisource returned {}",
                response.status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;
        parse_opensearch(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    #[test]
    fn test_parse_opensearch() {
        let body = json!([
            "大學",
            ["大學", "大學章句"],
            ["", ""],
            [
                "https://zh.wikisource.org/wiki/%E5%A4%A7%E5%AD%B8",
                "https://zh.wikisource.org/wiki/%E5%A4%A7%E5%AD%B8%E7%AB%A0%E5%8F%A5"
            ]
        ]);
        let results = parse_opensearch(&body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "大學章句");
        assert_eq!(results[1].preview, "找到相关条目：大學章句");
        assert_eq!(results[0].source, "维基文库");
        assert_eq!(results[0].chapter, "全文");
        assert_eq!(results[0].confidence, "78%");
        assert!(results[1].url.ends_with("%E7%AB%A0%E5%8F%A5"));
    }

    #[test]
    fn test_parse_opensearch_empty_and_malformed() {
        assert!(parse_opensearch(&json!(["x", [], [], []])).unwrap().is_empty());
        assert!(parse_opensearch(&json!(["x"])).unwrap().is_empty());
        assert!(matches!(
            parse_opensearch(&json!({"error": "bad"})),
            Err(SearchError::Parse(_))
        ));
    }

    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn http() -> HttpClient {
        HttpClient::new(Duration::from_secs(5), None).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_opensearch_query() {
        let router = Router::new().route(
            "/w/api.php",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q["action"], "opensearch");
                assert_eq!(q["search"], "中庸");
                assert_eq!(q["limit"], "3");
                Json(json!(["中庸", ["中庸"], [""], ["https://zh.wikisource.org/wiki/中庸"]]))
            }),
        );
        let base = spawn_mock(router).await;

        let results = WikisourceSource::new(&base, 3, http())
            .search("中庸")
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "中庸");
    }

    #[tokio::test]
    async fn test_non_success_is_unavailable() {
        let router = Router::new().route(
            "/w/api.php",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base = spawn_mock(router).await;

        let err = WikisourceSource::new(&base, 3, http())
            .search("中庸")
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Unavailable(_)));
    }
}
