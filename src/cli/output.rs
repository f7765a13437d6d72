//! CLI output: rendering of fingerprints and error mapping.

use crate::error::FingerprintError;
use crate::types::Fingerprint;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::{OwoColorize, Stream};
use std::fmt::Write;

/// One `<digest>  <path>` line per fingerprint, the manifest indented below when requested
pub fn format_text(fingerprints: &[Fingerprint], list: bool) -> String {
    let mut out = String::new();
    for fp in fingerprints {
        let _ = writeln!(out, "{}  {}", fp.digest, fp.root.display());
        if !list {
            continue;
        }
        for file in fp.files.iter().flatten() {
            let _ = writeln!(out, "    {}  {}", file.digest, file.relative_path);
        }
    }
    out.truncate(out.trim_end().len());
    out
}

/// A single fingerprint as an object, several as an array
pub fn format_json(fingerprints: &[Fingerprint]) -> Result<String, serde_json::Error> {
    match fingerprints {
        [single] => serde_json::to_string_pretty(single),
        many => serde_json::to_string_pretty(many),
    }
}

/// Table of entries that were left out of the digest, if any
pub fn format_skipped_table(fingerprint: &Fingerprint) -> Option<String> {
    if fingerprint.skipped.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Skipped path", "Kind", "Reason"]);
    for entry in &fingerprint.skipped {
        table.add_row(vec![
            entry.path.display().to_string(),
            entry.kind.to_string(),
            entry.reason.clone(),
        ]);
    }
    let heading = format!(
        "warning: {} entr{} under {} skipped",
        fingerprint.skipped.len(),
        if fingerprint.skipped.len() == 1 { "y" } else { "ies" },
        fingerprint.root.display()
    );
    Some(format!(
        "{}\n{}",
        heading.if_supports_color(Stream::Stderr, |t| t.yellow()),
        table
    ))
}

/// Map errors to a single line for stderr
pub fn map_error(e: &anyhow::Error) -> String {
    let message = match e.downcast_ref::<FingerprintError>() {
        Some(FingerprintError::UnsupportedAlgorithm(name)) => format!(
            "unsupported algorithm '{}' (choose md5, sha1, sha256 or sha512)",
            name
        ),
        Some(err) => err.to_string(),
        None => format!("{:#}", e),
    };
    format!(
        "{} {}",
        "error:".if_supports_color(Stream::Stderr, |t| t.red()),
        message
    )
}
