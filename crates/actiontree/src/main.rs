use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use actiontree::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli::default_log_filter(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    dispatch(cli.command, cancel).await
}

async fn dispatch(command: Commands, cancel: CancellationToken) -> Result<ExitCode> {
    match command {
        Commands::Scan(args) => cli::scan::run(&args, cancel).await,
        Commands::Discover { paths } => {
            cli::discover::run(&paths).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling scan");
            cancel.cancel();
        }
    });
}
