//! Canvas Shell - interactive client for the Canvas context server.
//!
//! Main entry point for the `canvas` binary.

use std::path::PathBuf;

use anyhow::Result;
use canvas_client::CanvasClient;
use canvas_config::ShellConfig;
use clap::Parser;

mod repl;

use repl::registry::Registry;
use repl::{render, Repl};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Canvas Shell - browse and switch Canvas contexts from the terminal
#[derive(Parser)]
#[command(name = "canvas")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (default: ~/.config/canvas/shell.json)
    #[arg(long, env = "CANVAS_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Human-readable console layer plus a rotating JSON file
    let filter = if cli.verbose {
        "canvas=debug,canvas_client=debug,canvas_config=debug,warn"
    } else {
        "warn"
    };

    let log_dir = canvas_config::config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "canvas.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "canvas=trace,canvas_client=trace,canvas_config=trace,info",
                )),
        )
        .init();

    let loaded = canvas_config::load_config(cli.config.as_deref());
    for warning in &loaded.warnings {
        render::warning(&mut std::io::stderr(), warning)?;
    }
    if let Some(source) = &loaded.source {
        tracing::debug!(path = %source.display(), "loaded config");
    }

    let client = match CanvasClient::from_config(&loaded.config) {
        Ok(client) => client,
        Err(e) => {
            render::warning(
                &mut std::io::stderr(),
                &format!("Invalid settings ({}). Using default settings.", e),
            )?;
            CanvasClient::from_config(&ShellConfig::default())?
        }
    };
    let repl = Repl::new(client, Registry::builtin());
    repl.run().await
}
