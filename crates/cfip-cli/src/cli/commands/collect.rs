//! `cfip-sync collect` - latency-filtered candidates from every source.

use anyhow::Result;
use cfip::{store, LatencyOptions, Pipeline, RegionClassifier};
use tracing::info;

use super::{selection, Context};
use crate::cli::args::CollectArgs;
use crate::output;

pub async fn execute(ctx: Context, args: CollectArgs) -> Result<()> {
    let pipeline = Pipeline::new(ctx.pipeline_config(), RegionClassifier::unavailable())?;

    let options = LatencyOptions {
        max_latency: args.max_latency.unwrap_or(ctx.config.max_latency),
        keep_no_latency: !args.require_latency,
        remove_duplicates: !args.keep_duplicates,
        limit: args.limit,
    };

    let result = pipeline.run_latency(&selection(&args.sources), options).await;

    // Nothing usable: keep the previous file and DNS records
    if result.records.is_empty() {
        output::print_empty(ctx.output_format, ctx.no_color);
        return Ok(());
    }

    let path = args.output.unwrap_or_else(|| ctx.config.output.clone());
    store::write_records(&path, &result.records).await?;
    info!(path = %path.display(), count = result.records.len(), "wrote records");

    output::print_run(ctx.output_format, &result, Some(&path), ctx.no_color)?;
    ctx.publish(&args.dns, &result.addresses).await
}
