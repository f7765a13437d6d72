//! Configuration System
//!
//! Layered configuration for fingerprint defaults and logging. Sources, lowest
//! precedence first: built-in defaults, the global config file, the project
//! `.treeprint.toml`, an explicit `--config` file, then `TREEPRINT__*`
//! environment variables. CLI flags are applied on top by the caller.

use crate::error::FingerprintError;
use crate::logging::LoggingConfig;
use crate::service::{default_concurrency, FingerprintOptions};
use crate::types::{ExclusionPolicy, HashAlgorithm};
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use merge::merge_policy::ENV_PREFIX;
pub use sources::project_file::PROJECT_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeprintConfig {
    /// Defaults for every fingerprint computation
    #[serde(default)]
    pub defaults: FingerprintDefaults,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fingerprint settings applied when the caller does not override them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintDefaults {
    /// md5, sha1, sha256 or sha512
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    #[serde(default)]
    pub exclude_files: Vec<String>,

    /// Bare extensions, without the leading dot
    #[serde(default)]
    pub exclude_extensions: Vec<String>,

    #[serde(default)]
    pub ignore_hidden: bool,

    #[serde(default)]
    pub follow_symlinks: bool,

    /// Files hashed at once (default: available parallelism)
    #[serde(default)]
    pub concurrency: Option<usize>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_algorithm() -> String {
    HashAlgorithm::default().name().to_string()
}

impl Default for FingerprintDefaults {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            exclude_files: Vec::new(),
            exclude_extensions: Vec::new(),
            ignore_hidden: false,
            follow_symlinks: false,
            concurrency: None,
            timeout_secs: None,
        }
    }
}

impl FingerprintDefaults {
    pub fn algorithm(&self) -> Result<HashAlgorithm, FingerprintError> {
        self.algorithm.parse()
    }

    pub fn policy(&self) -> ExclusionPolicy {
        ExclusionPolicy::new()
            .with_excluded_names(self.exclude_files.iter().cloned())
            .with_excluded_extensions(self.exclude_extensions.iter().cloned())
            .ignore_hidden(self.ignore_hidden)
            .follow_symlinks(self.follow_symlinks)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.algorithm().map_err(|e| e.to_string())?;
        if self.concurrency == Some(0) {
            return Err("concurrency must be at least 1".to_string());
        }
        if self.timeout_secs == Some(0) {
            return Err("timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }

    /// Build service options from these defaults
    pub fn to_options(&self) -> Result<FingerprintOptions, FingerprintError> {
        Ok(FingerprintOptions {
            algorithm: self.algorithm()?,
            policy: self.policy(),
            concurrency: self.concurrency.unwrap_or_else(default_concurrency),
            timeout: self.timeout_secs.map(Duration::from_secs),
            collect_manifest: false,
        })
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Defaults(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Defaults(msg) => write!(f, "defaults: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl TreeprintConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.defaults.validate() {
            errors.push(ValidationError::Defaults(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and turn validation failures into a single error
    pub fn validated(self) -> Result<Self, FingerprintError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            FingerprintError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}
