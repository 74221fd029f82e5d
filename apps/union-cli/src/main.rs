mod apilog;
mod commands;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Command;
use config::CliConfig;
use meituan_union::{Client, ClientBuilder, UnionError};
use std::path::PathBuf;
use std::time::Duration;

/// How long to wait for the API log write before exiting
const LOG_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Meituan Union command-line client
#[derive(Parser)]
#[command(name = "union-cli")]
#[command(about = "Call the Meituan Union open API and print the decoded response as JSON")]
#[command(version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (MEITUAN_UNION__*) -> 4) CLI flags
    let mut config = CliConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.verbose, cli.json_logs);
    logging::init(&config.logging)?;

    let api_command = match cli.command {
        Command::PrintConfig => {
            print!("{}", config.to_yaml()?);
            return Ok(());
        }
        Command::Api(api_command) => api_command,
    };

    let mut builder = ClientBuilder::from_config(&config.client);
    let mut log_writes = None;
    if let Some(api_log) = &config.api_log {
        let (sink, writes) = apilog::CountingSink::new(apilog::build_sink(api_log).await?);
        builder = builder.log_sink(sink);
        log_writes = Some(writes);
    }
    let client: Client = builder.build().context("failed to create client")?;

    let outcome = commands::execute(&client, api_command).await;

    // A transport failure never reaches the log sink.
    let logged = outcome
        .as_ref()
        .err()
        .and_then(|e| e.downcast_ref::<UnionError>())
        .is_none_or(|e| !e.is_transport());
    if let Some(writes) = log_writes.as_mut()
        && logged
        && !writes.wait_for(1, LOG_FLUSH_TIMEOUT).await
    {
        tracing::warn!("api log write did not finish before exit");
    }

    let output = outcome?;
    tracing::info!(
        trace_id = %output.trace_id,
        code = output.code,
        elapsed_ms = output.elapsed_ms,
        "call finished"
    );
    println!("{}", serde_json::to_string_pretty(&output)?);

    if !output.is_success() {
        anyhow::bail!("vendor error {}: {}", output.code, output.message);
    }
    Ok(())
}
