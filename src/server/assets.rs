//! Static asset constants (CSS and JavaScript).

/// Stylesheet for the web interface.
pub const CSS: &str = include_str!("styles.css");

/// Tab switching, upload, and API calls for the web interface.
pub const JS: &str = include_str!("scripts.js");
