mod analyzer;
mod cli;
mod commands;
mod config;
mod countdown;
mod data_loader;
mod inspect;
mod models;
mod render;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{show_demo, show_statusline, show_usage};
use config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for the statusline
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Statusline) {
        Commands::Statusline => {
            show_statusline(&config).await?;
        }
        Commands::Demo => {
            show_demo(config.bar_width)?;
        }
        Commands::Usage => {
            show_usage(&config)?;
        }
    }

    Ok(())
}
