//! Proofreading command.

use std::path::Path;

use console::style;

use crate::cli::helpers::{http_client, read_text};
use crate::cli::icons::{dim_arrow, success, warn};
use crate::compare::TextComparer;
use crate::config::{Config, Settings};
use crate::llm::LlmClient;

/// Compare two text files and print the proofreading report.
pub async fn cmd_compare(
    settings: &Settings,
    config: &Config,
    source: &Path,
    target: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let source_text = read_text(source).await?;
    let target_text = read_text(target).await?;

    let comparer = TextComparer::new(LlmClient::new(config.llm.clone(), http_client(settings)?));
    if !json {
        eprintln!(
            "{} Comparing with {} ({})",
            style("→").cyan(),
            comparer.llm().config().provider.as_str(),
            comparer.llm().config().effective_model()
        );
    }

    let report = comparer.compare(&source_text, &target_text).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_clean() {
        println!("{} No differences found", success());
        return Ok(());
    }

    if !report.differences.is_empty() {
        println!("{}", style("Differences").bold());
        for diff in &report.differences {
            println!(
                "  {} [{}] {} {} {}  {}",
                warn(),
                diff.kind,
                diff.original,
                dim_arrow(),
                diff.current,
                style(&diff.position).dim()
            );
        }
    }
    if !report.punctuation.is_empty() {
        println!("{}", style("Punctuation").bold());
        for issue in &report.punctuation {
            println!("  {} {}", warn(), issue.issue);
        }
    }
    if !report.suggestions.is_empty() {
        println!("{}", style("Suggestions").bold());
        for suggestion in &report.suggestions {
            println!("  {} {}", dim_arrow(), suggestion);
        }
    }
    Ok(())
}
