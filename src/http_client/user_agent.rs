//! User agent selection.

const DEFAULT_USER_AGENT: &str = concat!("gujiflow/", env!("CARGO_PKG_VERSION"));

/// Sent in `impersonate` mode; ctext.org turns away non-browser clients.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// `None` gives the crate agent, `"impersonate"` a desktop Chrome agent,
/// anything else is sent verbatim.
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config {
        None => DEFAULT_USER_AGENT,
        Some("impersonate") => BROWSER_USER_AGENT,
        Some(custom) => custom,
    }
    .to_string()
}
