//! Command implementations.

pub mod classify;
pub mod collect;
pub mod config;
pub mod regions;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use cfip::{PipelineConfig, RdapClient, RegionClassifier, SourceKind, SourceSelection};
use colored::Colorize;
use tracing::warn;

use crate::cli::args::DnsArgs;
use crate::config::Config;
use crate::dns::CloudflareDns;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration
    pub config: Config,

    /// Explicit config file, if one was given
    pub config_path: Option<PathBuf>,

    /// Output format
    pub output_format: OutputFormat,

    /// Disable colors
    pub no_color: bool,
}

impl Context {
    /// Pipeline settings from the loaded configuration.
    pub fn pipeline_config(&self) -> PipelineConfig {
        self.config.pipeline()
    }

    /// A classifier backed by RDAP lookups.
    pub fn rdap_classifier(&self) -> Result<RegionClassifier> {
        let client = RdapClient::new()?;
        Ok(RegionClassifier::with_lookup(Arc::new(client)))
    }

    /// Publish the first `dns_limit` addresses when `--update-dns` was given.
    ///
    /// Missing credentials skip publishing with a warning, as does an empty list.
    pub async fn publish(&self, dns: &DnsArgs, addresses: &[String]) -> Result<()> {
        if !dns.update_dns {
            return Ok(());
        }

        let domain = dns.cf_domain_name.clone().or_else(|| self.config.domain.clone());
        let (Some(token), Some(zone), Some(domain)) =
            (dns.cf_api_key.as_deref(), dns.cf_zone_id.as_deref(), domain)
        else {
            warn!(
                api_key = dns.cf_api_key.is_some(),
                zone_id = dns.cf_zone_id.is_some(),
                "Cloudflare settings incomplete, skipping DNS update"
            );
            return Ok(());
        };

        let limit = dns.dns_limit.unwrap_or(self.config.dns_limit);
        let selected: Vec<String> = addresses.iter().take(limit).cloned().collect();
        if selected.is_empty() {
            warn!("no addresses to publish, DNS left untouched");
            return Ok(());
        }

        let client = CloudflareDns::new(token, zone)?;
        let summary = client.publish(&domain, &selected).await?;

        if self.output_format == OutputFormat::Pretty {
            let line = format!(
                "DNS {domain}: {} deleted, {} created, {} failed",
                summary.deleted, summary.created, summary.failed
            );
            if self.no_color {
                println!("{line}");
            } else {
                println!("{}", line.green());
            }
        }
        Ok(())
    }
}

/// Source selection from `--sources`; none means every source.
pub fn selection(kinds: &[SourceKind]) -> SourceSelection {
    if kinds.is_empty() {
        SourceSelection::All
    } else {
        SourceSelection::kinds(kinds.iter().copied())
    }
}
