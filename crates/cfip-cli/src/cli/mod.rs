//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // `config` subcommands must work even when the file is broken
    let config = match &cli.command {
        Commands::Config(_) => Config::load(cli.config.as_deref()).unwrap_or_default(),
        _ => Config::load(cli.config.as_deref())?,
    };

    // Create context for commands
    let ctx = commands::Context {
        config,
        config_path: cli.config,
        output_format: cli.format.unwrap_or(OutputFormat::Pretty),
        no_color: cli.no_color,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Collect(args) => commands::collect::execute(ctx, args).await,
        Commands::Regions(args) => commands::regions::execute(ctx, args).await,
        Commands::Classify(args) => commands::classify::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args).await,
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
