//! `cfip-sync regions` - candidates confirmed to sit in the target regions.

use anyhow::Result;
use cfip::{store, Pipeline, RegionCode, RegionOptions};
use tracing::info;

use super::{selection, Context};
use crate::cli::args::{parse_regions, RegionsArgs};
use crate::output;

pub async fn execute(ctx: Context, args: RegionsArgs) -> Result<()> {
    let requested = if args.regions.is_empty() {
        &ctx.config.regions
    } else {
        &args.regions
    };
    let targets = parse_regions(requested)?;

    let pipeline = Pipeline::new(ctx.pipeline_config(), ctx.rdap_classifier()?)?;
    let options = RegionOptions {
        max_latency: args.max_latency.unwrap_or(ctx.config.region_max_latency),
        max_concurrency: args.concurrency.unwrap_or(ctx.config.max_concurrency),
    };

    let result = pipeline
        .run_regions(&selection(&args.sources), &targets, options)
        .await;

    // Strict: never overwrite the file or DNS with an empty set
    if result.addresses.is_empty() {
        output::print_empty(ctx.output_format, ctx.no_color);
        return Ok(());
    }

    let lines = tagged_lines(&result.addresses, &targets);
    let path = args.output.unwrap_or_else(|| ctx.config.region_output.clone());
    store::write_records(&path, &lines).await?;
    info!(path = %path.display(), count = lines.len(), "wrote records");

    output::print_run(ctx.output_format, &result, Some(&path), ctx.no_color)?;
    ctx.publish(&args.dns, &result.addresses).await
}

/// `ip#SGTWJP`-style lines for the output file
fn tagged_lines(addresses: &[String], targets: &[RegionCode]) -> Vec<String> {
    let tag: String = targets.iter().map(RegionCode::as_str).collect();
    addresses.iter().map(|ip| format!("{ip}#{tag}")).collect()
}
