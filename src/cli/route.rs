//! CLI route: run context built from configuration; merges flags and runs the service.

use crate::cli::output::{format_json, format_text};
use crate::cli::parse::{Cli, OutputFormat};
use crate::config::{ConfigLoader, TreeprintConfig};
use crate::error::FingerprintError;
use crate::service::{FingerprintOptions, FingerprintService};
use crate::types::Fingerprint;
use anyhow::{bail, Context};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Result of one CLI invocation
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub fingerprints: Vec<Fingerprint>,
    /// `Some(false)` when `--expect` was given and did not match
    pub expectation_met: Option<bool>,
}

impl RunOutcome {
    pub fn has_skipped(&self) -> bool {
        self.fingerprints.iter().any(|fp| !fp.is_complete())
    }
}

/// Runtime context for CLI execution, built from layered configuration.
pub struct RunContext {
    config: TreeprintConfig,
}

impl RunContext {
    /// Load and validate configuration for `project_root`, layering `config_path` on top.
    pub fn new(project_root: &Path, config_path: Option<&Path>) -> Result<Self, FingerprintError> {
        let config = ConfigLoader::load_layered(project_root, config_path)?.validated()?;
        Ok(Self { config })
    }

    pub fn from_config(config: TreeprintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TreeprintConfig {
        &self.config
    }

    /// Service options: config defaults with CLI flags applied on top.
    ///
    /// Exclusion lists from the CLI extend the configured ones; boolean flags
    /// can only switch a behavior on.
    pub fn options(&self, cli: &Cli) -> Result<FingerprintOptions, FingerprintError> {
        let mut options = self.config.defaults.to_options()?;

        if let Some(ref algorithm) = cli.algorithm {
            options.algorithm = algorithm.parse()?;
        }
        options.policy = options
            .policy
            .with_excluded_names(cli.exclude_files.iter().cloned())
            .with_excluded_extensions(cli.exclude_extensions.iter().cloned());
        if cli.ignore_hidden {
            options.policy.ignore_hidden = true;
        }
        if cli.follow_symlinks {
            options.policy.follow_symlinks = true;
        }
        if let Some(jobs) = cli.jobs {
            if jobs == 0 {
                return Err(FingerprintError::ConfigError(
                    "--jobs must be at least 1".to_string(),
                ));
            }
            options.concurrency = jobs;
        }
        if let Some(secs) = cli.timeout_secs {
            if secs == 0 {
                return Err(FingerprintError::ConfigError(
                    "--timeout-secs must be at least 1".to_string(),
                ));
            }
            options.timeout = Some(Duration::from_secs(secs));
        }
        options.collect_manifest = cli.list;

        Ok(options)
    }

    /// Fingerprint every path on the command line, in order.
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<RunOutcome> {
        if cli.expect.is_some() && cli.paths.len() != 1 {
            bail!("--expect requires exactly one path");
        }

        let options = self.options(cli)?;
        debug!(
            algorithm = %options.algorithm,
            concurrency = options.concurrency,
            "Resolved fingerprint options"
        );
        let service = FingerprintService::new(options);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .build()
            .context("Failed to start async runtime")?;

        let mut fingerprints = Vec::with_capacity(cli.paths.len());
        for path in &cli.paths {
            let fingerprint = runtime.block_on(service.fingerprint_concurrent(path))?;
            fingerprints.push(fingerprint);
        }

        let expectation_met = cli
            .expect
            .as_deref()
            .map(|expected| fingerprints.iter().all(|fp| fp.matches(expected)));
        if expectation_met == Some(false) {
            info!("Fingerprint does not match the expected digest");
        }

        Ok(RunOutcome {
            fingerprints,
            expectation_met,
        })
    }

    /// Render an outcome for stdout
    pub fn render(&self, cli: &Cli, outcome: &RunOutcome) -> anyhow::Result<String> {
        match cli.format {
            OutputFormat::Text => Ok(format_text(&outcome.fingerprints, cli.list)),
            OutputFormat::Json => {
                format_json(&outcome.fingerprints).context("Failed to serialize fingerprint")
            }
        }
    }
}
