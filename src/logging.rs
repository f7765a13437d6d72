//! Logging System
//!
//! Structured logging built on `tracing`. Stdout carries fingerprints, so logs
//! go to stderr or a file.

use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stderr, stdout, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (used when output is "file")
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Enable colored output (text format on a terminal only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("treeprint.log")
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Config that installs a subscriber filtering everything out
    pub fn disabled() -> Self {
        Self {
            level: "off".to_string(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        parse_format(&self.format)?;
        parse_output(&self.output)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
    File,
}

/// Initialize the global subscriber
///
/// Priority order (highest to lowest):
/// 1. Environment variables (TREEPRINT_LOG, TREEPRINT_LOG_FORMAT, TREEPRINT_LOG_OUTPUT)
/// 2. The given config (CLI flags merged over the config file)
/// 3. Defaults
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), FingerprintError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;

    let (writer, ansi) = match output {
        Output::Stdout => (
            BoxMakeWriter::new(std::io::stdout),
            ansi_enabled(config.color, std::io::stdout().is_terminal()),
        ),
        Output::Stderr => (
            BoxMakeWriter::new(std::io::stderr),
            ansi_enabled(config.color, std::io::stderr().is_terminal()),
        ),
        Output::File => {
            if let Some(parent) = config.file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    FingerprintError::ConfigError(format!("Failed to create log directory: {}", e))
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.file)
                .map_err(|e| {
                    FingerprintError::ConfigError(format!(
                        "Failed to open log file {:?}: {}",
                        config.file, e
                    ))
                })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    let registry = Registry::default().with(filter);
    let result = match format {
        Format::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        Format::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };

    result.map_err(|e| FingerprintError::ConfigError(format!("Failed to install logger: {}", e)))
}

/// Build the level filter from TREEPRINT_LOG or the config
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, FingerprintError> {
    if let Ok(filter) = EnvFilter::try_from_env("TREEPRINT_LOG") {
        return Ok(filter);
    }

    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(&config.level);
    for (module, module_level) in &config.modules {
        let directive = format!("{}={}", module, module_level);
        filter = filter.add_directive(directive.parse().map_err(|e| {
            FingerprintError::ConfigError(format!("Invalid log directive: {}", e))
        })?);
    }

    Ok(filter)
}

fn determine_format(config: &LoggingConfig) -> Result<Format, FingerprintError> {
    let env = std::env::var("TREEPRINT_LOG_FORMAT").ok();
    select_format(env.as_deref(), &config.format).map_err(FingerprintError::ConfigError)
}

fn determine_output(config: &LoggingConfig) -> Result<Output, FingerprintError> {
    let env = std::env::var("TREEPRINT_LOG_OUTPUT").ok();
    select_output(env.as_deref(), &config.output).map_err(FingerprintError::ConfigError)
}

/// An environment override wins over the config; an invalid value is an error either way.
fn select_format(env: Option<&str>, configured: &str) -> Result<Format, String> {
    parse_format(env.unwrap_or(configured))
}

fn select_output(env: Option<&str>, configured: &str) -> Result<Output, String> {
    parse_output(env.unwrap_or(configured))
}

/// Colors only when enabled and writing to a terminal
fn ansi_enabled(color: bool, is_terminal: bool) -> bool {
    color && is_terminal
}

fn parse_format(format: &str) -> Result<Format, String> {
    match format {
        "text" => Ok(Format::Text),
        "json" => Ok(Format::Json),
        other => Err(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        )),
    }
}

fn parse_output(output: &str) -> Result<Output, String> {
    match output {
        "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        "file" => Ok(Output::File),
        other => Err(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr', or 'file')",
            other
        )),
    }
}
