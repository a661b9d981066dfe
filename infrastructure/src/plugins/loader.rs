//! Plugin loading — reading a directory's exported tool candidates.
//!
//! The default [`ManifestLoader`] reads a manifest file from the plugin
//! directory, preferring the primary source form and falling back to the
//! compiled form:
//!
//! ```text
//! plugins/
//! ├── git-tools/
//! │   └── plugin.toml     (primary)
//! └── image-tools/
//!     └── plugin.json     (used only when plugin.toml is absent)
//! ```
//!
//! Either form must contain a `tools` array. Candidates are returned
//! untouched; validation is the registry's job.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Primary manifest file name
pub const PRIMARY_MANIFEST: &str = "plugin.toml";

/// Fallback manifest file name
pub const COMPILED_MANIFEST: &str = "plugin.json";

/// Manifest field holding the tool candidates
pub const TOOLS_FIELD: &str = "tools";

/// Why a plugin directory could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no {PRIMARY_MANIFEST} or {COMPILED_MANIFEST} in {}", .0.display())]
    MissingManifest(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{} does not export a `{TOOLS_FIELD}` array", .0.display())]
    NotACollection(PathBuf),
}

/// Loads the tool candidates exported by one plugin directory.
#[async_trait]
pub trait PluginLoader: Send + Sync {
    async fn load(&self, dir: &Path) -> Result<Vec<Value>, LoadError>;
}

/// Loader for `plugin.toml` / `plugin.json` manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read `path`, returning `None` if the file does not exist.
    async fn read_optional(path: &Path) -> Result<Option<String>, LoadError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse a manifest into an untyped value.
    pub fn parse(path: &Path, text: &str) -> Result<Value, LoadError> {
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let parsed = if is_toml {
            toml::from_str::<Value>(text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str::<Value>(text).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| LoadError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Take the `tools` array out of a parsed manifest.
    pub fn extract_tools(path: &Path, manifest: Value) -> Result<Vec<Value>, LoadError> {
        match manifest {
            Value::Object(mut map) => match map.remove(TOOLS_FIELD) {
                Some(Value::Array(candidates)) => Ok(candidates),
                _ => Err(LoadError::NotACollection(path.to_path_buf())),
            },
            _ => Err(LoadError::NotACollection(path.to_path_buf())),
        }
    }
}

#[async_trait]
impl PluginLoader for ManifestLoader {
    async fn load(&self, dir: &Path) -> Result<Vec<Value>, LoadError> {
        for file_name in [PRIMARY_MANIFEST, COMPILED_MANIFEST] {
            let path = dir.join(file_name);
            let Some(text) = Self::read_optional(&path).await? else {
                continue;
            };

            debug!(manifest = %path.display(), "Loading plugin manifest");
            let manifest = Self::parse(&path, &text)?;
            return Self::extract_tools(&path, manifest);
        }

        Err(LoadError::MissingManifest(dir.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, file: &str, contents: &str) {
        fs::write(dir.join(file), contents).unwrap();
    }

    #[tokio::test]
    async fn test_load_toml_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            PRIMARY_MANIFEST,
            r#"
name = "greeter"

[[tools]]
name = "greet"
description = "Say hello"
inputSchema = { type = "object" }
handler = { kind = "text", text = "hi {name}" }
"#,
        );

        let candidates = ManifestLoader.load(dir.path()).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["name"], "greet");
        assert_eq!(candidates[0]["inputSchema"]["type"], "object");
        assert_eq!(candidates[0]["handler"]["kind"], "text");
    }

    #[tokio::test]
    async fn test_falls_back_to_json_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            COMPILED_MANIFEST,
            r#"{ "tools": [{ "name": "a" }, { "name": "b" }] }"#,
        );

        let candidates = ManifestLoader.load(dir.path()).await.unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_prefers_toml_over_json() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), PRIMARY_MANIFEST, "[[tools]]\nname = \"from_toml\"\n");
        write(
            dir.path(),
            COMPILED_MANIFEST,
            r#"{ "tools": [{ "name": "from_json" }] }"#,
        );

        let candidates = ManifestLoader.load(dir.path()).await.unwrap();
        assert_eq!(candidates[0]["name"], "from_toml");
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = ManifestLoader.load(dir.path()).await.unwrap_err();
        assert!(matches!(err, LoadError::MissingManifest(_)));
    }

    #[tokio::test]
    async fn test_non_array_tools_is_not_a_collection() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), COMPILED_MANIFEST, r#"{ "tools": { "name": "x" } }"#);

        let err = ManifestLoader.load(dir.path()).await.unwrap_err();
        assert!(matches!(err, LoadError::NotACollection(_)));
        assert!(err.to_string().contains("does not export a `tools` array"));
    }

    #[tokio::test]
    async fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), PRIMARY_MANIFEST, "tools = [ this is not toml");

        let err = ManifestLoader.load(dir.path()).await.unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_extract_tools_from_non_object() {
        let path = Path::new("plugin.json");
        let err = ManifestLoader::extract_tools(path, serde_json::json!([1, 2])).unwrap_err();
        assert!(matches!(err, LoadError::NotACollection(_)));
    }
}
