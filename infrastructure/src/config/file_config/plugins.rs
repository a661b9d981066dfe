//! Plugin configuration from TOML (`[plugins]` section)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default plugin root, relative to the working directory
pub const DEFAULT_PLUGIN_ROOT: &str = "plugins";

/// Raw plugin configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePluginsConfig {
    /// Directory whose subdirectories are plugins
    pub root: PathBuf,
}

impl Default for FilePluginsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_PLUGIN_ROOT),
        }
    }
}
