//! Execution configuration from TOML (`[execution]` section)

use serde::{Deserialize, Serialize};
use toolgate_application::config::{DEFAULT_TIMEOUT_MS, ExecutionParams};

/// Raw execution configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Default deadline per tool call, in milliseconds
    pub timeout_ms: u64,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl FileExecutionConfig {
    pub fn to_params(&self) -> ExecutionParams {
        ExecutionParams::default().with_default_timeout_ms(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_execution_deserialize() {
        let toml_str = r#"
[execution]
timeout_ms = 2500
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.execution.timeout_ms, 2500);
        assert_eq!(
            config.execution.to_params().default_timeout,
            Duration::from_millis(2500)
        );
    }
}
