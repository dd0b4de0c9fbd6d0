//! ytrack - Yandex Tracker from the command line

use anyhow::Context;
use clap::Parser;

use ytrack::cli::{self, Cli};
use ytrack::error::AppError;
use ytrack::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match cli::load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => exit_with(&e),
    };
    logging::init(loaded.debug_enabled(cli.debug)).context("failed to initialize logging")?;

    if let Err(e) = cli::run(cli, loaded).await {
        tracing::error!(error = %e, "Command failed");
        exit_with(&e);
    }

    Ok(())
}

fn exit_with(e: &AppError) -> ! {
    eprintln!("error: {}", e.user_message());
    if let Some(action) = e.suggested_action() {
        eprintln!("hint: {}", action);
    }
    if let Some(dir) = logging::log_directory() {
        eprintln!("logs: {}", dir.display());
    }
    std::process::exit(1);
}
