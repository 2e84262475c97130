//! guji - classical Chinese text research workflow.
//!
//! Recognizes scanned pages of Qing-era books, looks up where a passage
//! comes from, and proofreads a transcription against a reference text.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gujiflow::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "gujiflow=info,tower_http=info"
    } else {
        "gujiflow=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
