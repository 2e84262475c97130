//! Baidu accurate OCR backend.
//!
//! Authenticates with OAuth client credentials (BAIDU_API_KEY and
//! BAIDU_SECRET_KEY), then posts the page to the accurate recognition
//! endpoint. Returned lines are reordered for vertical, right-to-left
//! reading before they are joined.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::backend::{OcrBackend, OcrBackendType, OcrError, OcrResult};
use super::config::BaiduConfig;
use super::image::ImagePayload;
use crate::http_client::HttpClient;

/// Text returned when Baidu finds no lines.
pub const NO_TEXT_FOUND: &str = "未识别到文字";

/// Refresh tokens this long before Baidu says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Error codes Baidu uses for QPS and daily quota limits.
const RATE_LIMIT_CODES: [i64; 3] = [17, 18, 19];

/// Error codes for an invalid or expired access token.
const BAD_TOKEN_CODES: [i64; 2] = [110, 111];

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AccurateResponse {
    error_code: Option<i64>,
    error_msg: Option<String>,
    #[serde(default)]
    words_result: Vec<WordsResult>,
}

/// One recognized line.
#[derive(Debug, Clone, Deserialize)]
pub struct WordsResult {
    pub words: String,
    pub location: Option<Location>,
    pub probability: Option<Probability>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Location {
    pub left: i64,
    pub top: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Probability {
    pub average: Option<f64>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Baidu accurate OCR backend.
pub struct BaiduBackend {
    config: BaiduConfig,
    http: HttpClient,
    token: Mutex<Option<CachedToken>>,
}

impl BaiduBackend {
    pub fn new(config: BaiduConfig, http: HttpClient) -> Self {
        Self {
            config,
            http,
            token: Mutex::new(None),
        }
    }

    /// Get a cached access token or fetch a fresh one.
    async fn access_token(&self) -> Result<String, OcrError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        let (api_key, secret_key) = match (&self.config.api_key, &self.config.secret_key) {
            (Some(api_key), Some(secret_key)) => (api_key, secret_key),
            _ => return Err(OcrError::BackendNotAvailable(self.availability_hint())),
        };

        let url = url::Url::parse_with_params(
            &self.config.token_url,
            &[
                ("grant_type", "client_credentials"),
                ("client_id", api_key.as_str()),
                ("client_secret", secret_key.as_str()),
            ],
        )
        .map_err(|e| OcrError::OcrFailed(format!("Invalid Baidu token URL: {}", e)))?;

        let response = self.http.post_form(url.as_str(), &[], &HashMap::new()).await?;
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|_| OcrError::OcrFailed("获取百度Access Token失败".to_string()))?;

        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| OcrError::OcrFailed("获取百度Access Token失败".to_string()))?;

        // Without expires_in the token is used once and not cached
        if let Some(expires_in) = body.expires_in {
            let lifetime = Duration::from_secs(expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
            debug!("Baidu token cached for {:?}", lifetime);
            *cached = Some(CachedToken {
                token: token.clone(),
                expires_at: Instant::now() + lifetime,
            });
        }

        Ok(token)
    }

    async fn forget_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl OcrBackend for BaiduBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Baidu
    }

    fn display_name(&self) -> String {
        "百度古文OCR".to_string()
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some() && self.config.secret_key.is_some()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Baidu OCR is available".to_string()
        } else {
            "BAIDU_API_KEY and BAIDU_SECRET_KEY not set. Create an app at https://console.bce.baidu.com/ai/"
                .to_string()
        }
    }

    async fn recognize(&self, image: &ImagePayload) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let token = self.access_token().await?;

        let url = url::Url::parse_with_params(&self.config.ocr_url, &[("access_token", &token)])
            .map_err(|e| OcrError::OcrFailed(format!("Invalid Baidu OCR URL: {}", e)))?;

        let form = [
            ("image", image.base64.as_str()),
            ("detect_direction", "true"),
            ("paragraph", "true"),
            ("probability", "true"),
        ];
        let response = self
            .http
            .post_form(url.as_str(), &form, &HashMap::new())
            .await?;

        if !response.is_success() {
            return Err(OcrError::OcrFailed(format!(
                "百度OCR请求失败: {}",
                response.status.as_u16()
            )));
        }

        let data: AccurateResponse = response
            .json()
            .await
            .map_err(|e| OcrError::OcrFailed(format!("Failed to parse Baidu response: {}", e)))?;

        if let Some(code) = data.error_code {
            let message = data.error_msg.unwrap_or_default();
            if RATE_LIMIT_CODES.contains(&code) {
                warn!("Baidu OCR quota hit: {} {}", code, message);
                return Err(OcrError::RateLimited {
                    backend: OcrBackendType::Baidu,
                    retry_after_secs: None,
                });
            }
            if BAD_TOKEN_CODES.contains(&code) {
                self.forget_token().await;
            }
            return Err(OcrError::OcrFailed(format!("百度OCR错误: {}", message)));
        }

        let elapsed = start.elapsed();
        debug!(
            "Baidu OCR: {} lines in {:?}",
            data.words_result.len(),
            elapsed
        );

        if data.words_result.is_empty() {
            return Ok(OcrResult {
                text: NO_TEXT_FOUND.to_string(),
                confidence: Some(0.0),
                processing_time_ms: elapsed.as_millis() as u64,
                word_count: 0,
                engine: self.display_name(),
                model: None,
            });
        }

        let lines = order_lines(data.words_result, self.config.column_tolerance);
        let text = lines
            .iter()
            .map(|line| line.words.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(OcrResult {
            text,
            confidence: Some(average_confidence(&lines)),
            processing_time_ms: elapsed.as_millis() as u64,
            word_count: lines.len(),
            engine: self.display_name(),
            model: None,
        })
    }
}

/// Order lines for vertical text: columns right to left, then top to bottom
/// within a column.
///
/// A column starts at the rightmost unplaced line and takes every following
/// line whose `left` is within `tolerance` of that anchor. Lines without a
/// location keep their relative order after all located lines.
pub fn order_lines(lines: Vec<WordsResult>, tolerance: i64) -> Vec<WordsResult> {
    let (mut located, unlocated): (Vec<_>, Vec<_>) =
        lines.into_iter().partition(|line| line.location.is_some());

    located.sort_by_key(|line| std::cmp::Reverse(line.location.map_or(0, |loc| loc.left)));

    let mut ordered = Vec::with_capacity(located.len() + unlocated.len());
    let mut column: Vec<WordsResult> = Vec::new();
    let mut anchor = None;

    for line in located {
        let left = line.location.map_or(0, |loc| loc.left);
        match anchor {
            Some(a) if a - left <= tolerance => {}
            _ => {
                flush_column(&mut column, &mut ordered);
                anchor = Some(left);
            }
        }
        column.push(line);
    }
    flush_column(&mut column, &mut ordered);

    ordered.extend(unlocated);
    ordered
}

fn flush_column(column: &mut Vec<WordsResult>, ordered: &mut Vec<WordsResult>) {
    column.sort_by_key(|line| line.location.map_or(0, |loc| loc.top));
    ordered.append(column);
}

/// Mean of the per-line average probabilities; missing values count as zero.
pub fn average_confidence(lines: &[WordsResult]) -> f32 {
    if lines.is_empty() {
        return 0.0;
    }
    let sum: f64 = lines
        .iter()
        .map(|line| line.probability.and_then(|p| p.average).unwrap_or(0.0))
        .sum();
    (sum / lines.len() as f64) as f32
}
