//! Shared helper functions for CLI commands.

use std::path::Path;

use anyhow::Context;
use tokio::io::AsyncReadExt;

use crate::config::Settings;
use crate::http_client::HttpClient;

/// Build the outbound HTTP client from settings.
pub fn http_client(settings: &Settings) -> anyhow::Result<HttpClient> {
    HttpClient::new(settings.request_timeout(), settings.user_agent.as_deref())
        .context("Failed to create HTTP client")
}

/// Read a UTF-8 text file, or stdin when the path is `-`.
pub async fn read_text(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// First `max_chars` characters, with an ellipsis when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
