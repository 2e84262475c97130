//! Chinese Text Project (ctext.org) full-text search.
//!
//! Scrapes the HTML result page. ctext rejects non-browser user agents, so
//! this source is built with an impersonating client.

use std::collections::HashMap;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{LiteratureSource, SearchError, SearchResult};
use crate::http_client::HttpClient;

/// Characters kept on each side of the match in a preview.
const PREVIEW_RADIUS: usize = 30;

pub struct CtextSource {
    base_url: String,
    limit: usize,
    http: HttpClient,
}

impl CtextSource {
    pub fn new(base_url: &str, limit: usize, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
            http,
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/searchbooks.pl?if=gb&searchmode=showall&searchu={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

/// Card linking to the full result page.
fn summary_card(query: &str, search_url: &str) -> SearchResult {
    SearchResult {
        title: "中国哲学书电子化计划搜索结果".to_string(),
        source: "ctext.org".to_string(),
        chapter: "找到多个匹配".to_string(),
        confidence: "85%".to_string(),
        preview: format!("在多部典籍中找到\"{}\"相关内容...", query),
        url: search_url.to_string(),
    }
}

/// Extract up to `limit` result rows whose text contains `query`.
///
/// Each innermost table row holding the query becomes a card titled by its
/// first link. Layout rows that wrap other rows are skipped.
pub fn extract_passages(
    html: &str,
    query: &str,
    search_url: &str,
    limit: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr")
        .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;
    let link_selector = Selector::parse("a[href]")
        .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;
    let base = url::Url::parse(search_url).ok();

    let mut results = Vec::new();
    for row in document.select(&row_selector) {
        if results.len() >= limit {
            break;
        }
        if row.select(&row_selector).any(|inner| inner.id() != row.id()) {
            continue;
        }

        let text = collapse_whitespace(&row);
        if !text.contains(query) {
            continue;
        }

        let link = row
            .select(&link_selector)
            .find(|a| !collapse_whitespace(a).is_empty());
        let (title, url) = match link {
            Some(a) => {
                let href = a.value().attr("href").unwrap_or_default();
                let url = base
                    .as_ref()
                    .and_then(|b| b.join(href).ok())
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| href.to_string());
                (collapse_whitespace(&a), url)
            }
            None => ("ctext.org".to_string(), search_url.to_string()),
        };

        results.push(SearchResult {
            title,
            source: "ctext.org".to_string(),
            chapter: "找到多个匹配".to_string(),
            confidence: "85%".to_string(),
            preview: snippet_around(&text, query, PREVIEW_RADIUS),
            url,
        });
    }

    Ok(results)
}

/// Element text with runs of whitespace collapsed to one space.
///
/// Text nodes are joined as-is first: ctext wraps matches in markup, and
/// Chinese has no word spacing to restore.
fn collapse_whitespace(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Up to `radius` characters either side of the first match, with ellipses
/// where text was cut.
pub fn snippet_around(text: &str, query: &str, radius: usize) -> String {
    let Some(byte_pos) = text.find(query) else {
        return text.chars().take(radius * 2).collect();
    };

    let match_start = text[..byte_pos].chars().count();
    let match_len = query.chars().count();
    let total = text.chars().count();

    let start = match_start.saturating_sub(radius);
    let end = (match_start + match_len + radius).min(total);

    let mut snippet: String = text.chars().skip(start).take(end - start).collect();
    if start > 0 {
        snippet.insert_str(0, "...");
    }
    if end < total {
        snippet.push_str("...");
    }
    snippet
}

#[async_trait]
impl LiteratureSource for CtextSource {
    fn name(&self) -> &str {
        "ctext"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let url = self.search_url(query);
        debug!("ctext search: {}", query);

        let response = self.http.get(&url, &HashMap::new()).await?;
        if !response.is_success() {
            return Err(SearchError::Unavailable(format!(
                "ctext.org returned {}",
                response.status
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Parse(format!("Failed to read response text: {}", e)))?;

        let passages = extract_passages(&html, query, &url, self.limit)?;
        debug!("Parsed {} passages from ctext", passages.len());

        if passages.is_empty() {
            return Ok(vec![summary_card(query, &url)]);
        }
        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        response::Html as HtmlBody,
        routing::get,
        Router,
    };

    const RESULT_PAGE: &str = r#"
<html><body>
<table width="100%"><tr><td>
  <table class="searchres">
    <tr><td>1.</td><td><a href="/analects/xue-er/zh">論語 - 學而</a></td>
        <td>子曰：「學而時習之，不亦說乎？有朋自遠方來，不亦樂乎？」</td></tr>
    <tr><td>2.</td><td><a href="/liji/xue-ji/zh">禮記 - 學記</a></td>
        <td>玉不琢，不成器；人不學，不知道。</td></tr>
    <tr><td>3.</td><td><a href="/xunzi/quan-xue/zh">荀子 - 勸學</a></td>
        <td>君子曰：學不可以已。學而時習之者，君子也。</td></tr>
  </table>
</td></tr></table>
</body></html>"#;

    #[test]
    fn test_extract_passages_matches_rows() {
        let url = "https://ctext.org/searchbooks.pl?if=gb&searchu=x";
        let results = extract_passages(RESULT_PAGE, "學而時習", url, 3).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "論語 - 學而");
        assert_eq!(results[0].url, "https://ctext.org/analects/xue-er/zh");
        assert!(results[0].preview.contains("學而時習之"));
        assert_eq!(results[1].title, "荀子 - 勸學");
        assert_eq!(results[1].confidence, "85%");
    }

    #[test]
    fn test_extract_passages_across_highlight_markup() {
        let page = r#"<table><tr><td><a href="/mengzi/zh">孟子</a></td>
            <td>孟子曰：「<b>學</b><b>而</b>不厭，誨人不倦。」</td></tr></table>"#;
        let results = extract_passages(page, "學而", "https://ctext.org/searchbooks.pl", 3).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "孟子");
        assert!(results[0].preview.contains("孟子曰：「學而不厭"));
    }

    #[test]
    fn test_extract_passages_respects_limit() {
        let url = "https://ctext.org/searchbooks.pl";
        let results = extract_passages(RESULT_PAGE, "學", url, 1).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_extract_passages_no_rows() {
        let results =
            extract_passages("<html><p>無結果</p></html>", "學而", "https://ctext.org/", 3).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_snippet_around_cuts_by_chars() {
        let text = "一二三四五六七八九十";
        assert_eq!(snippet_around(text, "五六", 2), "...三四五六七八...");
        assert_eq!(snippet_around(text, "一", 1), "一二...");
        assert_eq!(snippet_around(text, "十", 1), "...九十");
        assert_eq!(snippet_around(text, "無", 2), "一二三四");
    }

    #[test]
    fn test_summary_card() {
        let card = summary_card("仁者", "https://ctext.org/searchbooks.pl?searchu=x");
        assert_eq!(card.title, "中国哲学书电子化计划搜索结果");
        assert_eq!(card.preview, "在多部典籍中找到\"仁者\"相关内容...");
        assert_eq!(card.chapter, "找到多个匹配");
    }

    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn browser() -> HttpClient {
        HttpClient::new(Duration::from_secs(5), Some("impersonate")).unwrap()
    }

    #[tokio::test]
    async fn test_search_uses_browser_agent_and_query() {
        let router = Router::new().route(
            "/searchbooks.pl",
            get(
                |headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                    let agent = headers["user-agent"].to_str().unwrap().to_string();
                    assert!(agent.starts_with("Mozilla/5.0"));
                    assert_eq!(q["if"], "gb");
                    assert_eq!(q["searchmode"], "showall");
                    assert_eq!(q["searchu"], "學而時習");
                    HtmlBody(RESULT_PAGE)
                },
            ),
        );
        let base = spawn_mock(router).await;

        let results = CtextSource::new(&base, 3, browser())
            .search("學而時習")
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].url.starts_with(&base));
    }

    #[tokio::test]
    async fn test_unparseable_page_yields_summary_card() {
        let router = Router::new().route(
            "/searchbooks.pl",
            get(|| async { HtmlBody("<html><body>請稍候</body></html>") }),
        );
        let base = spawn_mock(router).await;

        let results = CtextSource::new(&base, 3, browser())
            .search("仁者")
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "中国哲学书电子化计划搜索结果");
        assert!(results[0].url.contains("searchu=%E4%BB%81%E8%80%85"));
    }

    #[tokio::test]
    async fn test_blocked_request_is_unavailable() {
        let router = Router::new().route(
            "/searchbooks.pl",
            get(|| async { StatusCode::FORBIDDEN }),
        );
        let base = spawn_mock(router).await;

        let err = CtextSource::new(&base, 3, browser())
            .search("仁者")
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Unavailable(_)));
    }
}
