//! Shared HTTP client for provider and search requests.

mod rate_limit;
mod response;
mod user_agent;

pub use rate_limit::{backoff_delay, parse_retry_after, retry_on_rate_limit, MAX_RETRIES};
pub use response::HttpResponse;
pub use user_agent::resolve_user_agent;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::debug;

/// HTTP client wrapper that fixes user agent and timeout for every request.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client.
    /// - None: default gujiflow user agent
    /// - Some("impersonate"): a real browser user agent
    /// - Some(custom): custom user agent string
    pub fn new(timeout: Duration, user_agent_config: Option<&str>) -> Result<Self, reqwest::Error> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, user_agent })
    }

    /// The user agent sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Make a GET request.
    pub async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<HttpResponse, reqwest::Error> {
        let request = with_headers(self.client.get(url), headers);
        self.send("GET", url, request).await
    }

    /// POST a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        headers: &HashMap<String, String>,
    ) -> Result<HttpResponse, reqwest::Error> {
        let request = with_headers(self.client.post(url).json(body), headers);
        self.send("POST", url, request).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &HashMap<String, String>,
    ) -> Result<HttpResponse, reqwest::Error> {
        let request = with_headers(self.client.post(url).form(form), headers);
        self.send("POST", url, request).await
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<HttpResponse, reqwest::Error> {
        let start = Instant::now();
        // Query strings may carry credentials (Baidu token endpoint), so
        // neither errors nor logs keep the URL.
        let response = request.send().await.map_err(reqwest::Error::without_url)?;

        debug!(
            "{} {} -> {} in {:?}",
            method,
            strip_query(url),
            response.status(),
            start.elapsed()
        );

        Ok(HttpResponse::from_response(response))
    }
}

fn with_headers(mut request: RequestBuilder, headers: &HashMap<String, String>) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Build a header map with a single bearer token.
pub fn bearer_headers(api_key: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Authorization".to_string(), format!("Bearer {}", api_key));
    headers
}
