//! Configuration management for gujiflow using the prefer crate.
//!
//! Provider credentials default to environment variables (see each
//! sub-config's `Default`); a config file only needs to mention what it
//! changes.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;
use crate::ocr::OcrConfig;
use crate::search::SearchConfig;

/// Default port for the web server.
pub const DEFAULT_PORT: u16 = 3000;

/// Default host for the web server.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default request timeout in seconds. Vision models can be slow.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 120;

/// Default request body limit. Images arrive base64-encoded inside JSON.
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the web server binds to.
    pub bind: String,
    /// User agent for outbound requests (None = crate default).
    pub user_agent: Option<String>,
    /// Outbound request timeout in seconds.
    pub request_timeout: u64,
    /// Maximum accepted request body.
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: std::env::var("GUJIFLOW_BIND")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT)),
            user_agent: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout)
    }
}

/// Configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server bind address (`PORT`, `HOST`, or `HOST:PORT`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// User agent: "impersonate" for a browser agent, or a custom string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Outbound request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,

    /// Maximum accepted request body in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<usize>,

    /// OCR engines.
    pub ocr: OcrConfig,

    /// LLM used for proofreading.
    pub llm: LlmConfig,

    /// Literature search sources.
    pub search: SearchConfig,

    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no file is found or it fails to parse.
    pub async fn load() -> Self {
        match prefer::load("gujiflow").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file: {}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// TOML and YAML by extension, JSON otherwise.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(limit) = self.max_body_bytes {
            settings.max_body_bytes = limit;
        }
    }

    /// Copy with all credentials masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.ocr = self.ocr.redacted();
        config.llm = self.llm.redacted();
        config
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(&expand_path(path)).await.unwrap_or_else(|e| {
            tracing::warn!("{}; using defaults", e);
            Config::default()
        }),
        None => Config::load().await,
    };

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    (settings, config)
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    PathBuf::from(expanded)
}

/// Parse a bind address string into a SocketAddr.
///
/// Accepts:
/// - `PORT` (e.g., "3000") -> 127.0.0.1:PORT
/// - `HOST` (e.g., "0.0.0.0") -> HOST:3000
/// - `HOST:PORT` (e.g., "0.0.0.0:3000")
pub fn parse_bind_address(bind: &str) -> anyhow::Result<SocketAddr> {
    let bind = bind.trim();

    // Just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(SocketAddr::from(([127, 0, 0, 1], port)));
    }

    // Full host:port (also handles bracketed IPv6)
    if let Ok(addr) = bind.parse::<SocketAddr>() {
        return Ok(addr);
    }

    // Bare host
    if let Ok(ip) = bind.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }
    if bind == "localhost" {
        return Ok(SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)));
    }

    anyhow::bail!(
        "Invalid bind address '{}'. Use PORT, HOST, or HOST:PORT",
        bind
    )
}
