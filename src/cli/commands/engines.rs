//! OCR engine listing.

use console::style;

use crate::cli::helpers::http_client;
use crate::cli::icons::{dim_arrow, error, success};
use crate::config::{Config, Settings};
use crate::ocr::build_manager;

/// Print each engine with its configuration status.
pub fn cmd_engines(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let manager = build_manager(&config.ocr, &http_client(settings)?);
    let primary = manager.primary_type();

    println!("{}", style("OCR engines").bold());
    for backend in manager.backends() {
        let kind = backend.backend_type();
        let marker = if kind == primary { " (default)" } else { "" };
        if backend.is_available() {
            println!(
                "  {} {:<8} {}{}",
                success(),
                kind.as_str(),
                backend.display_name(),
                marker
            );
        } else {
            println!(
                "  {} {:<8} {}{}",
                error(),
                kind.as_str(),
                backend.display_name(),
                marker
            );
            println!("      {} {}", dim_arrow(), backend.availability_hint());
        }
    }
    Ok(())
}
