//! CLI entrypoint for toolgate
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod serve;

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use commands::{Cli, Command};
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use toolgate_application::{CallToolUseCase, ExecuteToolUseCase, ToolCatalog};
use toolgate_infrastructure::{ConfigLoader, JsonlFailureLog, PluginRegistry};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level (RUST_LOG wins when set)
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries results, diagnostics go to stderr
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {e}"))?
    };
    for issue in config.validate() {
        warn!("{}", issue);
    }

    // === Dependency Injection ===
    let plugin_root = cli
        .plugins
        .clone()
        .unwrap_or_else(|| config.plugins.root.clone());
    let registry = PluginRegistry::new(plugin_root);
    registry.init().await;
    info!(tools = registry.stats().total_tools, "Registry ready");

    let failure_log = Arc::new(JsonlFailureLog::new(config.logging.file_path()));
    let executor = ExecuteToolUseCase::new(failure_log).with_params(config.execution.to_params());
    let calls = Arc::new(CallToolUseCase::new(registry.clone(), executor.clone()));

    let command = cli.command.unwrap_or(Command::List { json: false });
    let exit = match command {
        Command::List { json } => {
            list(&registry, json)?;
            ExitCode::SUCCESS
        }
        Command::Call {
            name,
            args,
            timeout_ms,
        } => {
            let arguments = match serde_json::from_str::<Value>(&args)? {
                Value::Object(map) => map,
                other => bail!("--args must be a JSON object, got: {}", other),
            };

            let result = calls
                .call_with_timeout(&name, arguments, timeout_ms.map(Duration::from_millis))
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if result.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Command::Serve => {
            info!("Serving requests from stdin");
            serve::run(calls).await?;
            ExitCode::SUCCESS
        }
    };

    executor.flush_failure_logs().await;
    Ok(exit)
}

fn list(registry: &PluginRegistry, json: bool) -> Result<()> {
    let tools = registry.list_tools();

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    if tools.is_empty() {
        println!("No tools registered.");
        return Ok(());
    }

    for tool in &tools {
        let source = registry
            .provenance(&tool.name)
            .map(|p| p.to_string())
            .unwrap_or_default();
        println!("{:<24} {:<20} {}", tool.name, source, tool.description);
    }
    Ok(())
}
