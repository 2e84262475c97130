//! Image recognition command.

use std::path::Path;

use anyhow::Context;
use console::style;

use crate::cli::helpers::http_client;
use crate::cli::icons::{dim_arrow, success};
use crate::config::{Config, Settings};
use crate::ocr::{build_manager, ImagePayload, OcrBackendType};

/// Recognize a page image and print the text.
pub async fn cmd_ocr(
    settings: &Settings,
    config: &Config,
    file: &Path,
    engine: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let backend_type = match engine {
        Some(name) => OcrBackendType::from_str(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown OCR engine: {}", name))?,
        None => config.ocr.default_engine,
    };

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let image = ImagePayload::from_bytes(&bytes, Some(file))?;

    let manager = build_manager(&config.ocr, &http_client(settings)?);
    if !json {
        eprintln!(
            "{} Recognizing {} with {}",
            style("→").cyan(),
            file.display(),
            backend_type
        );
    }

    let result = manager.recognize_with(&image, backend_type).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", result.text);
    eprintln!();
    eprintln!(
        "{} {} ({} {}, {}ms)",
        success(),
        result.engine,
        result.word_count,
        count_unit(backend_type),
        result.processing_time_ms
    );
    if let Some(confidence) = result.confidence {
        eprintln!("  {} Confidence: {:.0}%", dim_arrow(), confidence * 100.0);
    }
    Ok(())
}

/// What `word_count` counts for an engine.
fn count_unit(backend_type: OcrBackendType) -> &'static str {
    match backend_type {
        OcrBackendType::Baidu => "lines",
        OcrBackendType::Claude | OcrBackendType::Zhipu | OcrBackendType::NewApi => "chars",
    }
}
