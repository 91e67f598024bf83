//! Browser log redirection entry point.

mod app;
mod cli;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config = config::resolve(&cli, |key| std::env::var(key).ok())?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        enabled = config.enabled,
        "starting browserlog"
    );

    let rt = tokio::runtime::Runtime::new()?;
    let code = rt.block_on(app::run(cli, config))?;

    std::process::exit(code);
}
