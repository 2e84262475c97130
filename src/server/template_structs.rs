//! Askama template structs for the web interface.
//!
//! Each struct corresponds to an HTML template in the templates/ directory.

use askama::Template;

/// Entry in the OCR engine selector.
pub struct EngineOption {
    pub id: &'static str,
    pub name: String,
    pub available: bool,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub title: &'a str,
    pub engines: Vec<EngineOption>,
}
