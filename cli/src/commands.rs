//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for toolgate
#[derive(Parser, Debug)]
#[command(name = "toolgate")]
#[command(author, version, about = "Bounded tool dispatch over a hot-reloadable plugin registry")]
#[command(long_about = r#"
toolgate loads tools from plugin directories and runs them under a deadline.

Every subdirectory of the plugin root is a plugin with a plugin.toml (or
plugin.json) manifest listing its tools. Failed calls are returned as error
results and appended to a JSONL failure log.

Configuration files are loaded from (in priority order):
1. TOOLGATE_* environment variables
2. --config <path>     Explicit config file
3. ./toolgate.toml     Project-level config
4. ~/.config/toolgate/config.toml   Global config

Example:
  toolgate list
  toolgate call greet --args '{"name": "Ada"}'
  toolgate call refresh_plugins --args '{"plugin": "git-tools"}'
  toolgate serve < requests.jsonl
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Plugin root directory (overrides config)
    #[arg(long, value_name = "DIR", global = true)]
    pub plugins: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered tools
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Call one tool and print its result as JSON
    Call {
        /// Tool name
        name: String,

        /// Arguments as a JSON object
        #[arg(short, long, value_name = "JSON", default_value = "{}")]
        args: String,

        /// Deadline for this call (overrides config)
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,
    },

    /// Serve JSON-line requests from stdin until EOF
    Serve,
}
