//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section is optional; missing keys take their defaults.

mod execution;
mod logging;
mod plugins;

pub use execution::FileExecutionConfig;
pub use logging::FileLoggingConfig;
pub use plugins::{DEFAULT_PLUGIN_ROOT, FilePluginsConfig};

use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Bounded executor settings
    pub execution: FileExecutionConfig,
    /// Failure log settings
    pub logging: FileLoggingConfig,
    /// Plugin discovery settings
    pub plugins: FilePluginsConfig,
}

impl FileConfig {
    /// Check for values that load fine but are probably mistakes.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.execution.timeout_ms == 0 {
            issues.push(
                "execution.timeout_ms is 0: every tool call will time out immediately".to_string(),
            );
        }

        if self.logging.file.trim().is_empty() {
            issues.push(format!(
                "logging.file is empty, falling back to '{}'",
                self.logging.file_path().display()
            ));
        }

        if self.plugins.root.as_os_str().is_empty() {
            issues.push("plugins.root is empty: no plugins will be discovered".to_string());
        }

        issues
    }
}
