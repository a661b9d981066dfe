//! Plugin registry — the live table of dispatchable tools.
//!
//! The registry owns the name → tool table that requests are dispatched
//! against. It is filled lazily on first use and can be rebuilt while
//! requests are in flight:
//!
//! ```text
//!            init() / reload_all()                 reload_plugin(target)
//!                     │                                     │
//!   plugins/ ─► sorted subdirs ─► load + admit      resolve target dir
//!                     │                                     │
//!          fresh table (built-ins first)     clone table, replace that dir's tools
//!                     └──────────────┬──────────────────────┘
//!                                    ▼
//!                      atomic swap of Arc<ToolTable>
//! ```
//!
//! Readers clone the current `Arc<ToolTable>` and never block on a reload;
//! a lookup sees either the old table or the new one, never a mix.
//! Reloads themselves are serialized.
//!
//! # Ordering and conflicts
//!
//! - Built-in tools (starting with `refresh_plugins`) are listed first, and
//!   their names are reserved: plugin candidates reusing one are rejected.
//! - Plugin directories are visited in lexicographic order. When two
//!   directories export the same name, the later directory wins.
//! - A scoped reload only replaces tools owned by its directory; names owned
//!   by another directory are left alone.
//! - A reloaded tool whose definition is unchanged keeps its identity.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use toolgate_application::ports::tool_catalog::ToolCatalog;
use toolgate_domain::tool::{
    HandlerResolver, Provenance, Tool, ToolInfo, admit_tool, candidate_label,
};
use tracing::{debug, info, warn};

use super::loader::{LoadError, ManifestLoader, PluginLoader};
use super::refresh::refresh_tool;
use crate::handlers::HandlerCatalog;

/// Errors from a scoped reload. The live table is unchanged in every case.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Failed to reload plugin {plugin}: {source}")]
    LoadFailed {
        plugin: String,
        #[source]
        source: LoadError,
    },

    #[error("Failed to reload plugin {0}: no valid tools exported")]
    NoValidTools(String),
}

/// What a reload covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadScope {
    All,
    Plugin(String),
}

/// Outcome of a successful reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadSummary {
    pub scope: ReloadScope,
    /// Names in the new table, in listing order
    pub tool_names: Vec<String>,
}

impl ReloadSummary {
    pub fn tool_count(&self) -> usize {
        self.tool_names.len()
    }
}

/// Registry statistics
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    pub total_tools: usize,
    pub builtin_tools: usize,
    pub tools_per_plugin: HashMap<String, usize>,
}

#[derive(Clone)]
struct Entry {
    tool: Arc<Tool>,
    provenance: Provenance,
    /// Candidate the tool was admitted from (plugins only)
    source: Option<Value>,
}

/// Insertion-ordered name → entry map.
#[derive(Clone, Default)]
struct ToolTable {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl ToolTable {
    fn get(&self, name: &str) -> Option<&Entry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Insert or replace in place (a replaced name keeps its position)
    fn insert(&mut self, entry: Entry) {
        match self.index.get(&entry.tool.name) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.tool.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    fn retain(&mut self, keep: impl Fn(&Entry) -> bool) {
        self.entries.retain(keep);
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.tool.name.clone(), i))
            .collect();
    }

    fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.tool.name.clone()).collect()
    }
}

/// Builder for [`PluginRegistry`].
pub struct PluginRegistryBuilder {
    root: PathBuf,
    loader: Arc<dyn PluginLoader>,
    resolver: Arc<dyn HandlerResolver>,
    builtins: Vec<Tool>,
}

impl PluginRegistryBuilder {
    /// Use a different loader (default: [`ManifestLoader`])
    pub fn loader(mut self, loader: Arc<dyn PluginLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Use a different handler resolver (default: [`HandlerCatalog::new`])
    pub fn resolver(mut self, resolver: Arc<dyn HandlerResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Add a built-in tool, listed after `refresh_plugins`
    pub fn builtin(mut self, tool: Tool) -> Self {
        self.builtins.push(tool);
        self
    }

    pub fn build(self) -> Arc<PluginRegistry> {
        Arc::new_cyclic(|registry| {
            let mut builtins = vec![Arc::new(refresh_tool(registry.clone()))];
            builtins.extend(self.builtins.into_iter().map(Arc::new));

            PluginRegistry {
                root: self.root,
                loader: self.loader,
                resolver: self.resolver,
                builtins,
                table: RwLock::new(None),
                reload_lock: Mutex::new(()),
            }
        })
    }
}

/// Hot-reloadable tool registry backed by a plugin root directory.
pub struct PluginRegistry {
    root: PathBuf,
    loader: Arc<dyn PluginLoader>,
    resolver: Arc<dyn HandlerResolver>,
    builtins: Vec<Arc<Tool>>,
    /// `None` until the first discovery
    table: RwLock<Option<Arc<ToolTable>>>,
    reload_lock: Mutex<()>,
}

impl PluginRegistry {
    pub fn builder(root: impl Into<PathBuf>) -> PluginRegistryBuilder {
        PluginRegistryBuilder {
            root: root.into(),
            loader: Arc::new(ManifestLoader::new()),
            resolver: Arc::new(HandlerCatalog::new()),
            builtins: Vec::new(),
        }
    }

    /// Registry with the default manifest loader and handler kinds
    pub fn new(root: impl Into<PathBuf>) -> Arc<Self> {
        Self::builder(root).build()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Run the first discovery. No-op once the registry is loaded.
    pub async fn init(&self) {
        let _guard = self.reload_lock.lock().await;
        if self.is_loaded() {
            return;
        }

        let table = self.discover(None).await;
        info!(
            root = %self.root.display(),
            tools = table.entries.len(),
            "Plugin registry initialized"
        );
        self.swap(table);
    }

    /// Rebuild the whole table from disk.
    pub async fn reload_all(&self) -> ReloadSummary {
        let _guard = self.reload_lock.lock().await;

        let previous = self.snapshot();
        let table = self.discover(previous.as_deref()).await;
        let tool_names = table.names();
        info!(tools = tool_names.len(), "Reloaded all plugins");
        self.swap(table);

        ReloadSummary {
            scope: ReloadScope::All,
            tool_names,
        }
    }

    /// Reload the one plugin directory identified by `target`.
    ///
    /// `target` is first looked up as a tool name (its owning directory is
    /// reloaded), then as a directory name under the plugin root. An
    /// unloaded registry is initialized first.
    pub async fn reload_plugin(&self, target: &str) -> Result<ReloadSummary, RegistryError> {
        self.init().await;
        let _guard = self.reload_lock.lock().await;

        let current = self.snapshot().unwrap_or_default();
        let dir = self.resolve_plugin_dir(&current, target).await?;

        let candidates = self
            .loader
            .load(&self.root.join(&dir))
            .await
            .map_err(|source| RegistryError::LoadFailed {
                plugin: dir.clone(),
                source,
            })?;

        let admitted = self.admit_all(&dir, candidates);
        if admitted.is_empty() {
            return Err(RegistryError::NoValidTools(dir));
        }

        let mut table = ToolTable::clone(&current);
        table.retain(|entry| entry.provenance.plugin_dir() != Some(dir.as_str()));
        for (tool, source) in admitted {
            // Repeats within `dir` replace each other, as in full discovery
            let foreign_owner = table
                .get(&tool.name)
                .map(|e| &e.provenance)
                .filter(|owner| owner.plugin_dir() != Some(dir.as_str()));
            if let Some(owner) = foreign_owner {
                warn!(
                    plugin = %dir,
                    tool = %tool.name,
                    owner = %owner,
                    "Tool name already taken, skipping"
                );
                continue;
            }
            self.insert_plugin_tool(&mut table, Some(&*current), &dir, tool, source);
        }

        let tool_names = table.names();
        info!(plugin = %dir, tools = tool_names.len(), "Reloaded plugin");
        self.swap(table);

        Ok(ReloadSummary {
            scope: ReloadScope::Plugin(dir),
            tool_names,
        })
    }

    /// Where the named tool came from
    pub fn provenance(&self, name: &str) -> Option<Provenance> {
        self.snapshot()?.get(name).map(|e| e.provenance.clone())
    }

    pub fn stats(&self) -> RegistryStats {
        let Some(table) = self.snapshot() else {
            return RegistryStats::default();
        };

        let mut stats = RegistryStats {
            total_tools: table.entries.len(),
            ..Default::default()
        };
        for entry in &table.entries {
            match &entry.provenance {
                Provenance::Builtin => stats.builtin_tools += 1,
                Provenance::Plugin(dir) => {
                    *stats.tools_per_plugin.entry(dir.clone()).or_default() += 1
                }
            }
        }
        stats
    }

    fn snapshot(&self) -> Option<Arc<ToolTable>> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn swap(&self, table: ToolTable) {
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(table));
    }

    async fn discover(&self, previous: Option<&ToolTable>) -> ToolTable {
        let mut table = ToolTable::default();
        for tool in &self.builtins {
            table.insert(Entry {
                tool: Arc::clone(tool),
                provenance: Provenance::Builtin,
                source: None,
            });
        }

        let dirs = self.plugin_dirs().await;
        let loads = join_all(dirs.iter().map(|dir| self.load_dir(dir))).await;

        for (dir, admitted) in dirs.iter().zip(loads) {
            for (tool, source) in admitted {
                match table.get(&tool.name).map(|e| &e.provenance) {
                    Some(Provenance::Builtin) => {
                        warn!(
                            plugin = %dir,
                            tool = %tool.name,
                            "Tool name is reserved by a built-in, skipping"
                        );
                        continue;
                    }
                    Some(Provenance::Plugin(owner)) => {
                        debug!(
                            plugin = %dir,
                            tool = %tool.name,
                            previous = %owner,
                            "Tool overrides an earlier plugin"
                        );
                    }
                    None => {}
                }
                self.insert_plugin_tool(&mut table, previous, dir, tool, source);
            }
        }

        table
    }

    /// Insert a plugin tool, reusing the previous `Arc<Tool>` when the
    /// directory exported an identical definition.
    fn insert_plugin_tool(
        &self,
        table: &mut ToolTable,
        previous: Option<&ToolTable>,
        dir: &str,
        tool: Tool,
        source: Value,
    ) {
        let reused = previous
            .and_then(|prev| prev.get(&tool.name))
            .filter(|e| e.provenance.plugin_dir() == Some(dir))
            .filter(|e| e.source.as_ref() == Some(&source))
            .map(|e| Arc::clone(&e.tool));

        table.insert(Entry {
            tool: reused.unwrap_or_else(|| Arc::new(tool)),
            provenance: Provenance::Plugin(dir.to_string()),
            source: Some(source),
        });
    }

    /// Immediate subdirectories of the plugin root, sorted by name.
    async fn plugin_dirs(&self) -> Vec<String> {
        let mut read_dir = match tokio::fs::read_dir(&self.root).await {
            Ok(read_dir) => read_dir,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "Cannot read plugin root");
                return Vec::new();
            }
        };

        let mut dirs = Vec::new();
        loop {
            match read_dir.next_entry().await {
                Ok(Some(entry)) => {
                    // Follows symlinks, like scoped reload target lookup
                    let is_dir = tokio::fs::metadata(entry.path())
                        .await
                        .map(|m| m.is_dir())
                        .unwrap_or(false);
                    if !is_dir {
                        continue;
                    }
                    match entry.file_name().into_string() {
                        Ok(name) => dirs.push(name),
                        Err(name) => warn!(dir = ?name, "Skipping plugin directory with non-UTF-8 name"),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "Error while listing plugin root");
                    break;
                }
            }
        }

        dirs.sort();
        dirs
    }

    /// Load and admit one directory; failures are logged and yield nothing.
    async fn load_dir(&self, dir: &str) -> Vec<(Tool, Value)> {
        match self.loader.load(&self.root.join(dir)).await {
            Ok(candidates) => self.admit_all(dir, candidates),
            Err(e) => {
                warn!(plugin = %dir, error = %e, "Skipping plugin");
                Vec::new()
            }
        }
    }

    fn admit_all(&self, dir: &str, candidates: Vec<Value>) -> Vec<(Tool, Value)> {
        candidates
            .into_iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                match admit_tool(&candidate, self.resolver.as_ref()) {
                    Some(tool) => Some((tool, candidate)),
                    None => {
                        warn!(
                            plugin = %dir,
                            index,
                            candidate = %candidate_label(&candidate),
                            "Rejected export: not a valid tool"
                        );
                        None
                    }
                }
            })
            .collect()
    }

    async fn resolve_plugin_dir(
        &self,
        table: &ToolTable,
        target: &str,
    ) -> Result<String, RegistryError> {
        if let Some(dir) = table.get(target).and_then(|e| e.provenance.plugin_dir()) {
            return Ok(dir.to_string());
        }

        if !is_plain_dir_name(target) {
            return Err(RegistryError::PluginNotFound(target.to_string()));
        }

        match tokio::fs::metadata(self.root.join(target)).await {
            Ok(meta) if meta.is_dir() => Ok(target.trim_end_matches('/').to_string()),
            _ => Err(RegistryError::PluginNotFound(target.to_string())),
        }
    }
}

impl ToolCatalog for PluginRegistry {
    fn list_tools(&self) -> Vec<ToolInfo> {
        self.snapshot()
            .map(|table| table.entries.iter().map(|e| e.tool.info()).collect())
            .unwrap_or_default()
    }

    fn get_tool(&self, name: &str) -> Option<Arc<Tool>> {
        self.snapshot()?.get(name).map(|e| Arc::clone(&e.tool))
    }
}

/// A single normal path component, so the target stays inside the root.
fn is_plain_dir_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
