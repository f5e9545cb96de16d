//! `cfip-sync config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Path => show_path(&ctx),
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Init { force } => init_config(&ctx, force),
    }
}

fn show_path(ctx: &Context) -> Result<()> {
    let path = Config::resolve_path(ctx.config_path.as_deref())?;
    println!("{}", path.display());
    Ok(())
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Plain => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        OutputFormat::Pretty => {
            println!("{}", "Current Configuration:".bold());
            println!();
            println!("  {} {}", "max_latency:".bold(), config.max_latency);
            println!("  {} {}", "regions:".bold(), config.regions.join(", "));
            println!("  {} {}", "region_max_latency:".bold(), config.region_max_latency);
            println!("  {} {}", "max_concurrency:".bold(), config.max_concurrency);
            println!("  {} {}", "output:".bold(), config.output.display());
            println!("  {} {}", "region_output:".bold(), config.region_output.display());
            println!("  {} {}", "dns_limit:".bold(), config.dns_limit);

            let domain = config
                .domain
                .clone()
                .unwrap_or_else(|| "(not set)".dimmed().to_string());
            println!("  {} {}", "domain:".bold(), domain);

            let sources = config.pipeline().sources;
            let origin = if config.sources.is_some() { "configured" } else { "built-in" };
            println!("  {} {} ({origin})", "sources:".bold(), sources.len());
            for source in &sources {
                println!("    - {source}");
            }
        }
    }

    Ok(())
}

fn init_config(ctx: &Context, force: bool) -> Result<()> {
    let path = Config::resolve_path(ctx.config_path.as_deref())?;
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}\n\
             Use --force to overwrite it.",
            path.display()
        );
    }

    let config = Config {
        sources: Some(cfip::default_sources()),
        ..Config::default()
    };
    config.save(&path)?;

    println!("{} Wrote {}", "Success:".green().bold(), path.display());
    Ok(())
}
