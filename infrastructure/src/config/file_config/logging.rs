//! Failure log configuration from TOML (`[logging]` section)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::DEFAULT_LOG_FILE;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Default failure log path (`TOOLGATE_LOG_FILE` takes precedence)
    pub file: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl FileLoggingConfig {
    /// Configured path, falling back to the default when blank
    pub fn file_path(&self) -> PathBuf {
        if self.file.trim().is_empty() {
            PathBuf::from(DEFAULT_LOG_FILE)
        } else {
            PathBuf::from(&self.file)
        }
    }
}
