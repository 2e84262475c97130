//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod compare;
mod config_cmd;
mod engines;
mod ocr;
mod search;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "guji")]
#[command(about = "Classical Chinese text research workflow: OCR, source lookup, proofreading")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web interface
    Serve {
        /// Bind address: PORT, HOST, or HOST:PORT (default from config, then 127.0.0.1:3000)
        bind: Option<String>,
    },

    /// Recognize the text in a page image
    Ocr {
        /// Image file to recognize
        file: PathBuf,
        /// Engine to use (claude, zhipu, baidu, newapi); defaults to the configured engine
        #[arg(short, long)]
        engine: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Proofread a text against a reference with the configured LLM
    Compare {
        /// Reference text file (treated as the standard version, `-` for stdin)
        source: PathBuf,
        /// Text file to proofread
        target: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up where a passage comes from
    Search {
        /// Passage to search for (at least 2 characters)
        query: String,
        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List OCR engines and whether they are configured
    Engines,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration with credentials masked
    Show,
    /// Print the path of the loaded config file
    Path,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config.clone(),
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &config, &bind).await
        }
        Commands::Ocr { file, engine, json } => {
            ocr::cmd_ocr(&settings, &config, &file, engine.as_deref(), json).await
        }
        Commands::Compare {
            source,
            target,
            json,
        } => compare::cmd_compare(&settings, &config, &source, &target, json).await,
        Commands::Search { query, json } => {
            search::cmd_search(&settings, &config, &query, json).await
        }
        Commands::Engines => engines::cmd_engines(&settings, &config),
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&config),
            ConfigCommands::Path => config_cmd::cmd_config_path(&config),
        },
    }
}
