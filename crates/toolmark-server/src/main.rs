// crates/toolmark-server/src/main.rs
// toolmark - tool-call ledger, issue reports and layered style preferences

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files (global first, then project - project overrides)
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".toolmark/.env"));
    }
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        match &cli.command {
            Some(Commands::Serve) | None => Level::WARN, // Quiet for stdio
            Some(Commands::Tool { .. }) => Level::WARN,
            Some(_) => Level::INFO,
        }
    };

    // stdout carries tool output, logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let project_root = cli.project_root.clone();
    match cli.command {
        None | Some(Commands::Serve) => cli::run_serve(project_root).await?,
        Some(Commands::Tool { name, args }) => cli::run_tool(project_root, name, args).await?,
        Some(Commands::Stats { recent }) => cli::run_stats(recent).await?,
        Some(Commands::Issues {
            limit,
            severity,
            category,
        }) => cli::run_issues(limit, severity, category).await?,
        Some(Commands::Styles { action }) => cli::run_styles(project_root, action).await?,
        Some(Commands::Config { check }) => cli::run_config(check)?,
    }

    Ok(())
}
