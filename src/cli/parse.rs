//! CLI parse: clap types for treeprint. No behavior; definitions only.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Treeprint CLI - order-independent content fingerprints
#[derive(Debug, Parser)]
#[command(name = "treeprint", version)]
#[command(about = "Compute a deterministic fingerprint of a file or directory tree")]
pub struct Cli {
    /// Files or directories to fingerprint
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Hash algorithm (md5, sha1, sha256, sha512)
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// File name to leave out of directory fingerprints (repeatable)
    #[arg(long = "exclude-file", value_name = "NAME")]
    pub exclude_files: Vec<String>,

    /// Extension to leave out of directory fingerprints, without the dot (repeatable)
    #[arg(long = "exclude-ext", value_name = "EXT")]
    pub exclude_extensions: Vec<String>,

    /// Skip hidden files and everything under hidden directories
    #[arg(long)]
    pub ignore_hidden: bool,

    /// Descend into symlinked directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Number of files hashed concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also print the digest of every included file
    #[arg(long)]
    pub list: bool,

    /// Exit with status 2 unless the fingerprint equals this digest
    #[arg(long, value_name = "DIGEST")]
    pub expect: Option<String>,

    /// Configuration file path (layered over the discovered config files)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
