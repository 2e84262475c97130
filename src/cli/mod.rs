//! Command-line interface for gujiflow.

mod commands;
mod helpers;
pub mod icons;

pub use commands::{is_verbose, run};
