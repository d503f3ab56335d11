mod analysis;
mod cli;
mod commands;
mod config;
mod display;
mod input;
mod intake;
mod report;
mod session;
mod thinking;
mod transport;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use session::AnalysisSession;

/// Submit a resume for analysis and export the report.
#[derive(Debug, Parser)]
#[command(name = "resume-analyzer", version)]
struct Args {
    /// Config file (defaults to ~/.resume-analyzer/config.toml)
    #[arg(long, env = "RESUME_ANALYZER_CONFIG")]
    config: Option<PathBuf>,

    /// Override a config value, e.g. `--set endpoint=http://localhost:8000`
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    overrides: Vec<(String, String)>,

    /// File to select on startup
    #[arg(long)]
    file: Option<PathBuf>,
}

fn parse_override(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = config::load_or_create_config(args.config.as_deref())?;
    config.merge_overrides(args.overrides)?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut session = AnalysisSession::from_config(&config)?;
    info!(configured = session.controller.is_configured(), "session ready");

    if let Some(path) = &args.file {
        session
            .select_path(path)
            .await
            .with_context(|| format!("Failed to select {}", path.display()))?;
    }

    cli::run_cli(session, config).await
}
