//! Literature search command.

use console::style;

use crate::cli::helpers::{http_client, truncate_chars};
use crate::cli::icons::dim_arrow;
use crate::config::{Config, Settings};
use crate::search::LiteratureSearch;

/// Search the configured sources for a passage.
pub async fn cmd_search(
    settings: &Settings,
    config: &Config,
    query: &str,
    json: bool,
) -> anyhow::Result<()> {
    let http = http_client(settings)?;
    let search = LiteratureSearch::new(&config.search, &http, settings.request_timeout())?;

    let results = search.search(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        println!("{}", style(&result.title).bold());
        println!(
            "  {} {} · {} · {}",
            dim_arrow(),
            result.source,
            result.chapter,
            result.confidence
        );
        println!("  {}", truncate_chars(&result.preview, 120));
        if !result.url.is_empty() {
            println!("  {}", style(&result.url).cyan().underlined());
        }
        println!();
    }
    Ok(())
}
