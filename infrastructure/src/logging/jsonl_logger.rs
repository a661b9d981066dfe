//! JSONL file writer for failed tool executions.
//!
//! Each [`FailureLogEntry`] is serialized as a single JSON line and appended
//! to the log file. The file is resolved on every append:
//!
//! 1. an explicit override (per call, or fixed with [`JsonlFailureLog::with_override`])
//! 2. the `TOOLGATE_LOG_FILE` environment variable
//! 3. the configured default path

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use toolgate_application::ports::failure_log::{FailureLog, FailureLogEntry};
use tracing::warn;

/// Environment variable overriding the configured log file
pub const LOG_FILE_ENV: &str = "TOOLGATE_LOG_FILE";

/// Default failure log location, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "logs/tool-errors.log";

/// Append-only JSONL failure log.
///
/// Writes are serialized through a mutex so concurrent failures never
/// interleave within a line. I/O errors are reported via `tracing` and
/// otherwise swallowed.
pub struct JsonlFailureLog {
    default_path: PathBuf,
    override_path: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl JsonlFailureLog {
    /// Create a log whose fallback path is `default_path`.
    pub fn new(default_path: impl Into<PathBuf>) -> Self {
        Self {
            default_path: default_path.into(),
            override_path: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Always write to `path`, ignoring the environment.
    pub fn with_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    /// The file the next append would go to.
    pub fn resolve_path(&self, override_path: Option<&Path>) -> PathBuf {
        self.resolve_path_with(override_path, std::env::var_os(LOG_FILE_ENV))
    }

    fn resolve_path_with(&self, override_path: Option<&Path>, env: Option<OsString>) -> PathBuf {
        if let Some(path) = override_path.or(self.override_path.as_deref()) {
            return path.to_path_buf();
        }
        match env {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => self.default_path.clone(),
        }
    }

    /// Append `entry`, optionally to a specific file.
    pub fn append_to(&self, entry: &FailureLogEntry, override_path: Option<&Path>) {
        let path = self.resolve_path(override_path);
        if let Err(e) = self.write_line(&path, entry) {
            warn!(
                path = %path.display(),
                tool = %entry.tool,
                error = %e,
                "Could not write failure log entry"
            );
        }
    }

    fn write_line(&self, path: &Path, entry: &FailureLogEntry) -> io::Result<()> {
        let mut line = serde_json::to_string(entry).map_err(io::Error::other)?;
        line.push('\n');

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())
    }
}

impl FailureLog for JsonlFailureLog {
    fn append(&self, entry: FailureLogEntry) {
        self.append_to(&entry, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Arc;

    fn entry(tool: &str, message: &str) -> FailureLogEntry {
        FailureLogEntry::new(
            tool,
            12,
            message,
            Some(message.to_string()),
            Some(serde_json::json!({ "x": 1 })),
        )
    }

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_creates_parent_dir_and_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/errors.log");
        let log = JsonlFailureLog::new(DEFAULT_LOG_FILE).with_override(&path);

        log.append(entry("first", "boom"));
        log.append(entry("second", "bang"));

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["tool"], "first");
        assert_eq!(lines[0]["level"], "error");
        assert_eq!(lines[0]["durationMs"], 12);
        assert_eq!(lines[0]["args"]["x"], 1);
        assert_eq!(lines[1]["message"], "bang");
    }

    #[test]
    fn test_append_to_existing_file_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        std::fs::write(&path, "{\"previous\":true}\n").unwrap();

        JsonlFailureLog::new(&path).append_to(&entry("t", "m"), Some(&path));

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["previous"], true);
    }

    #[test]
    fn test_omits_absent_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        let log = JsonlFailureLog::new(&path).with_override(&path);

        log.append(FailureLogEntry::new("t", 0, "Unknown error", None, None));

        let line = std::fs::read_to_string(&path).unwrap();
        assert!(!line.contains("stack"));
        assert!(!line.contains("args"));
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending
        let log = JsonlFailureLog::new(dir.path()).with_override(dir.path());
        log.append(entry("t", "m"));
    }

    #[test]
    fn test_resolution_order() {
        let log = JsonlFailureLog::new("default.log");
        let env = Some(OsString::from("env.log"));

        assert_eq!(
            log.resolve_path_with(Some(Path::new("call.log")), env.clone()),
            PathBuf::from("call.log")
        );
        assert_eq!(log.resolve_path_with(None, env), PathBuf::from("env.log"));
        assert_eq!(
            log.resolve_path_with(None, Some(OsString::new())),
            PathBuf::from("default.log")
        );
        assert_eq!(log.resolve_path_with(None, None), PathBuf::from("default.log"));

        let fixed = JsonlFailureLog::new("default.log").with_override("fixed.log");
        assert_eq!(
            fixed.resolve_path_with(None, Some(OsString::from("env.log"))),
            PathBuf::from("fixed.log")
        );
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        let log = Arc::new(JsonlFailureLog::new(&path).with_override(&path));

        let threads: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for j in 0..10 {
                        log.append(entry(&format!("tool{i}"), &format!("failure {j}")));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(read_lines(&path).len(), 80);
    }
}
