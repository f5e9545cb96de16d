//! Local line-file source.

use crate::error::SourceResult;
use crate::store;
use cfip_core::Candidate;
use std::path::Path;
use tracing::info;

/// Read records from `path`. A missing file is not an error: it yields no records.
pub async fn read(path: &Path) -> SourceResult<Vec<Candidate>> {
    if !tokio::fs::try_exists(path).await? {
        info!(path = %path.display(), "local source file not found, skipping");
        return Ok(Vec::new());
    }
    store::read_records(path).await
}
