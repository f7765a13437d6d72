//! Treeprint CLI Binary
//!
//! Prints order-independent fingerprints of files and directory trees.

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use treeprint::cli::{format_skipped_table, map_error, Cli, RunContext};
use treeprint::config::ConfigLoader;
use treeprint::logging::{init_logging, LoggingConfig};

const EXIT_FAILURE: u8 = 1;
const EXIT_MISMATCH: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(EXIT_FAILURE);
    }

    info!("Treeprint starting");

    let context = match RunContext::new(Path::new("."), cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", map_error(&e.into()));
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let outcome = match context.execute(&cli) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Fingerprint failed: {:#}", e);
            eprintln!("{}", map_error(&e));
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    for fingerprint in &outcome.fingerprints {
        if let Some(table) = format_skipped_table(fingerprint) {
            eprintln!("{}", table);
        }
    }

    match context.render(&cli, &outcome) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            eprintln!("{}", map_error(&e));
            return ExitCode::from(EXIT_FAILURE);
        }
    }

    if outcome.expectation_met == Some(false) {
        return ExitCode::from(EXIT_MISMATCH);
    }
    ExitCode::SUCCESS
}

/// Build logging configuration from CLI args and config file.
/// Logging stays off unless --verbose or --log-level is given.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    if !cli.verbose && cli.log_level.is_none() {
        return LoggingConfig::disabled();
    }

    let mut config = ConfigLoader::load_layered(Path::new("."), cli.config.as_deref())
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
        if cli.log_output.is_none() {
            config.output = "file".to_string();
        }
    }

    config
}
