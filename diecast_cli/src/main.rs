use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConfigAction};
use commands::*;

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "diecast_core=info,diecast_cli=info",
        _ => "diecast_core=debug,diecast_cli=debug",
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so `--output json` stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Commands::Search {
            query,
            sources,
            limit,
        } => search::run(&cli, query, sources, *limit).await,
        Commands::Sources => sources::run(&cli).await,
        Commands::Config { action } => {
            config::run(&cli, action.clone().unwrap_or(ConfigAction::Show)).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}
