//! Plugin discovery and hot reload
//!
//! Every immediate subdirectory of the plugin root is one plugin. Its
//! manifest exports tool candidates, which are admitted through the tool
//! contract and registered with their provenance.

pub mod loader;
pub mod refresh;
pub mod registry;

pub use loader::{
    COMPILED_MANIFEST, LoadError, ManifestLoader, PRIMARY_MANIFEST, PluginLoader, TOOLS_FIELD,
};
pub use refresh::REFRESH_TOOL_NAME;
pub use registry::{
    PluginRegistry, PluginRegistryBuilder, RegistryError, RegistryStats, ReloadScope,
    ReloadSummary,
};
