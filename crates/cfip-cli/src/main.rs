//! cfip-sync - collect fast Cloudflare edge IPs and optionally publish them to DNS.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    cfip_cli::run().await
}
