//! Config loading facade: assembles sources in precedence order.

use super::merge::merge_policy;
use super::sources::{global_file, project_file};
use super::TreeprintConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`TreeprintConfig`] from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, `<project_root>/.treeprint.toml`, environment
    pub fn load(project_root: &Path) -> Result<TreeprintConfig, ConfigError> {
        Self::load_layered(project_root, None)
    }

    /// Defaults, the given file (required), environment
    pub fn load_from_file(path: &Path) -> Result<TreeprintConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(merge_policy::environment_source());
        builder.build()?.try_deserialize()
    }

    /// Every source; `explicit` (if given) overrides the discovered files.
    pub fn load_layered(
        project_root: &Path,
        explicit: Option<&Path>,
    ) -> Result<TreeprintConfig, ConfigError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        builder = project_file::add_to_builder(builder, project_root)?;
        if let Some(path) = explicit {
            debug!(config_path = %path.display(), "Loading explicit configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(merge_policy::environment_source());
        builder.build()?.try_deserialize()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
