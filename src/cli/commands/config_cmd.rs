//! Configuration inspection commands.

use crate::cli::icons::warn;
use crate::config::Config;

/// Print the effective configuration as TOML with secrets masked.
pub fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    if config.source_path.is_none() {
        eprintln!("{} No config file found; showing defaults", warn());
    }
    print!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}

/// Print where the config was loaded from.
pub fn cmd_config_path(config: &Config) -> anyhow::Result<()> {
    match config.source_path {
        Some(ref path) => println!("{}", path.display()),
        None => {
            eprintln!("{} No config file found", warn());
            eprintln!("  Searched for gujiflow.toml, gujiflow.yaml and gujiflow.json");
        }
    }
    Ok(())
}
