//! `cfip-sync classify` - registry region of individual addresses.

use std::net::IpAddr;

use anyhow::{Context as _, Result};
use colored::Colorize;
use serde_json::json;

use super::Context;
use crate::cli::args::ClassifyArgs;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: ClassifyArgs) -> Result<()> {
    let classifier = ctx.rdap_classifier()?;

    let mut rows = Vec::with_capacity(args.ips.len());
    for raw in &args.ips {
        let ip: IpAddr = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid IP address: {raw}"))?;
        let region = classifier.classify(ip).await;
        rows.push((ip, region));
    }

    match ctx.output_format {
        OutputFormat::Json => {
            let items: Vec<_> = rows
                .iter()
                .map(|(ip, region)| json!({ "ip": ip, "region": region }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Plain => {
            for (ip, region) in &rows {
                let region = region.as_ref().map_or("-", |r| r.as_str());
                println!("{ip}\t{region}");
            }
        }
        OutputFormat::Pretty => {
            for (ip, region) in &rows {
                match region {
                    Some(code) if !ctx.no_color => {
                        println!("{:<40} {}", ip.to_string(), code.as_str().cyan().bold());
                    }
                    Some(code) => println!("{:<40} {code}", ip.to_string()),
                    None if !ctx.no_color => {
                        println!("{:<40} {}", ip.to_string(), "unknown".dimmed());
                    }
                    None => println!("{:<40} unknown", ip.to_string()),
                }
            }
        }
    }

    Ok(())
}
