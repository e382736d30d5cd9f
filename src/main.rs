//! Notewise CLI entry point.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use notewise::cli::{commands, Cli};
use notewise::config::Settings;
use notewise::source::SourceRef;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("notewise={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let Some(source) = cli.source()? else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match &source {
        SourceRef::RemoteFolder(input) => commands::run_folder(input, settings).await?,
        _ => commands::run_analyze(&source, cli.format, settings).await?,
    }

    Ok(())
}
