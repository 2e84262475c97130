//! gujiflow - research workflow for classical Chinese texts.
//!
//! - `ocr`: page image recognition through remote vision engines
//! - `search`: passage lookup on ctext.org and Wikisource
//! - `compare`: LLM proofreading of a transcription against a reference
//! - `server`: the web UI and JSON API over all three

pub mod cli;
pub mod compare;
pub mod config;
pub mod http_client;
pub mod llm;
pub mod ocr;
pub mod search;
pub mod server;
