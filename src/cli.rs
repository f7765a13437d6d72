//! CLI domain: parse, route, and output only.
//! Fingerprinting itself lives in the service; this layer merges flags over
//! configuration and renders results.

mod output;
mod parse;
mod route;

pub use output::{format_json, format_skipped_table, format_text, map_error};
pub use parse::{Cli, OutputFormat};
pub use route::{RunContext, RunOutcome};
