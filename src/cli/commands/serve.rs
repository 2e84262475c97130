//! Web server command.

use console::style;

use crate::config::{parse_bind_address, Config, Settings};

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, config: &Config, bind: &str) -> anyhow::Result<()> {
    let addr = parse_bind_address(bind)?;

    println!(
        "{} Starting 古籍研究智能工作流 server at http://{}",
        style("→").cyan(),
        addr
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, config, addr).await
}
