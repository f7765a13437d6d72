//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};

/// Prefix for environment overrides, e.g. `TREEPRINT__DEFAULTS__ALGORITHM=sha256`
pub const ENV_PREFIX: &str = "TREEPRINT";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("defaults.algorithm", "md5")?
        .set_default("defaults.exclude_files", Vec::<String>::new())?
        .set_default("defaults.exclude_extensions", Vec::<String>::new())?
        .set_default("defaults.ignore_hidden", false)?
        .set_default("defaults.follow_symlinks", false)
}

/// Environment source, applied last so it overrides every file.
///
/// List-valued keys accept comma-separated values.
pub fn environment_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("defaults.exclude_files")
        .with_list_parse_key("defaults.exclude_extensions")
}
