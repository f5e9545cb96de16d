//! Command-line argument definitions using clap.

use crate::output::OutputFormat;
use cfip::{RegionCode, SourceKind};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Collect fast Cloudflare edge IPs from public lists
///
/// Fetches every configured source, drops slow entries, optionally keeps only
/// registry-confirmed regions, writes the result to a file and can publish the
/// best addresses as Cloudflare A records.
#[derive(Parser, Debug)]
#[command(name = "cfip-sync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "CFIP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Console output format
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Increase verbosity (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect candidates below a latency threshold
    Collect(CollectArgs),

    /// Collect candidates located in the given regions
    Regions(RegionsArgs),

    /// Show the registry region of addresses
    Classify(ClassifyArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Collect command
// ============================================================================

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Keep records faster than this many milliseconds
    #[arg(short = 'l', long)]
    pub max_latency: Option<f64>,

    /// Source kinds to use (markup, text, api, local)
    #[arg(short, long, value_delimiter = ',')]
    pub sources: Vec<SourceKind>,

    /// File receiving the full records
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print at most this many addresses
    #[arg(long)]
    pub limit: Option<usize>,

    /// Drop records that carry no latency
    #[arg(long)]
    pub require_latency: bool,

    /// Keep duplicate records
    #[arg(long)]
    pub keep_duplicates: bool,

    #[command(flatten)]
    pub dns: DnsArgs,
}

// ============================================================================
// Regions command
// ============================================================================

#[derive(Args, Debug)]
pub struct RegionsArgs {
    /// Target region codes (repeatable; `ASIA` expands to the Asian preset)
    #[arg(short, long = "region", value_name = "CODE")]
    pub regions: Vec<String>,

    /// Keep records faster than this many milliseconds
    #[arg(short = 'l', long)]
    pub max_latency: Option<f64>,

    /// Concurrent registry lookups
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Source kinds to use (markup, text, api, local)
    #[arg(short, long, value_delimiter = ',')]
    pub sources: Vec<SourceKind>,

    /// File receiving `ip#REGIONS` lines
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub dns: DnsArgs,
}

// ============================================================================
// Classify command
// ============================================================================

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Addresses to classify
    #[arg(required = true)]
    pub ips: Vec<String>,
}

// ============================================================================
// DNS publishing
// ============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct DnsArgs {
    /// Replace the domain's A records with the best addresses
    #[arg(long)]
    pub update_dns: bool,

    /// Cloudflare API token
    #[arg(long, env = "CF_API_KEY", hide_env_values = true)]
    pub cf_api_key: Option<String>,

    /// Cloudflare zone id
    #[arg(long, env = "CF_ZONE_ID")]
    pub cf_zone_id: Option<String>,

    /// Record name to publish (e.g. `fast.example.com`)
    #[arg(long, env = "CF_DOMAIN_NAME")]
    pub cf_domain_name: Option<String>,

    /// Number of addresses to publish
    #[arg(long)]
    pub dns_limit: Option<usize>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the config file path
    Path,

    /// Show the effective configuration
    Show,

    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Expand region arguments into codes, resolving the `ASIA` preset.
pub fn parse_regions(values: &[String]) -> cfip::Result<Vec<RegionCode>> {
    let mut codes: Vec<RegionCode> = Vec::new();
    for value in values.iter().flat_map(|v| v.split(',')) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if value.eq_ignore_ascii_case("asia") {
            codes.extend(cfip::ASIA_REGIONS.iter().map(|c| RegionCode::new(c)));
        } else {
            codes.push(value.parse()?);
        }
    }
    let mut seen = std::collections::HashSet::new();
    codes.retain(|c| seen.insert(c.clone()));
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_collect() {
        let cli = Cli::try_parse_from([
            "cfip-sync",
            "collect",
            "--max-latency",
            "80",
            "--sources",
            "text,api",
            "--limit",
            "5",
        ])
        .unwrap();
        let Commands::Collect(args) = cli.command else {
            panic!("expected collect");
        };
        assert_eq!(args.max_latency, Some(80.0));
        assert_eq!(args.sources, vec![SourceKind::TextList, SourceKind::Api]);
        assert_eq!(args.limit, Some(5));
        assert!(!args.dns.update_dns);
    }

    #[test]
    fn test_parse_regions_expands_asia() {
        let codes = parse_regions(&["sg,tw".to_string(), "ASIA".to_string()]).unwrap();
        assert_eq!(codes[0], RegionCode::new("SG"));
        assert_eq!(codes[1], RegionCode::new("TW"));
        assert_eq!(codes.len(), cfip::ASIA_REGIONS.len());
        assert!(parse_regions(&["S1".to_string()]).is_err());
    }
}
