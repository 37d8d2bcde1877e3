mod cli;
mod commands;
mod config;
mod telemetry;

use clap::Parser;
use tracing::error;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load variables from .env when present; the real environment wins.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    telemetry::init()?;
    let cli = Cli::parse();

    let outcome = match &cli.command {
        Command::List(args) => commands::list(&cli.manifest, args).await.map(|_| ()),
        Command::Embed(args) => commands::embed(&cli.manifest, &args.subdir, &args.opts)
            .await
            .map(|_| ()),
        Command::Run(args) => commands::run(&cli.manifest, &args.list, &args.opts)
            .await
            .map(|_| ()),
    };

    if let Err(e) = &outcome {
        if let Some(hint) = commands::failure_hint(e) {
            error!("{hint}");
        }
    }
    outcome
}
