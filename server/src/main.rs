//! Switchboard: intent dispatch and service optimizer.
//!
//! Usage:
//!   switchboard serve
//!   switchboard classify "সার্ভারে সমস্যা হয়েছে"
//!   switchboard dispatch "review my code" --context '{"file": "main.rs"}'
//!   switchboard run-cycle
//!
//! Every subcommand accepts `--config <path>`; without it the built-in
//! configuration is used.

mod config;
mod context;
mod probe;
mod routes;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use switchboard_core::traits::IntentClassifier;

use crate::config::SwitchboardConfig;
use crate::context::{build_classifier, AppContext};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Routes free-text requests to agents and watches the services they run on.
#[derive(Parser)]
#[command(name = "switchboard", version, about = "Intent dispatch and service optimizer")]
struct Cli {
    /// Configuration file. Defaults to the built-in configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server and the background schedulers.
    Serve,
    /// Print the intent classification for TEXT.
    Classify { text: String },
    /// Dispatch TEXT once and print the result.
    Dispatch {
        text: String,
        /// JSON object passed to the agent as context.
        #[arg(long)]
        context: Option<String>,
    },
    /// Run one optimizer cycle and print the summary.
    RunCycle,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = SwitchboardConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Serve => {
            info!("Switchboard v{} starting", env!("CARGO_PKG_VERSION"));
            let ctx = Arc::new(AppContext::from_config(config)?);
            server::run(ctx).await
        }
        Command::Classify { text } => {
            let classifier = build_classifier(&config)?;
            print_json(&classifier.classify(&text))
        }
        Command::Dispatch { text, context } => {
            let context: Option<serde_json::Value> = context
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .context("--context must be valid JSON")?;
            let ctx = AppContext::from_config(config)?;
            let result = ctx.dispatcher.dispatch(&text, context).await;
            print_json(&result)
        }
        Command::RunCycle => {
            let ctx = Arc::new(AppContext::from_config(config)?);
            let summary = tokio::task::spawn_blocking(move || ctx.optimizer.run_cycle()).await?;
            print_json(&summary)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
