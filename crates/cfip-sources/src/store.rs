//! Line-delimited record files.
//!
//! Reading keeps each non-blank trimmed line as one record; writing emits each
//! record followed by `\n`.

use crate::adapters::text;
use crate::error::SourceResult;
use cfip_core::Candidate;
use std::path::Path;
use tracing::info;

/// Read every record in a line file
pub async fn read_records(path: &Path) -> SourceResult<Vec<Candidate>> {
    let content = tokio::fs::read_to_string(path).await?;
    let records = text::parse(&content);
    info!(path = %path.display(), count = records.len(), "read records from file");
    Ok(records)
}

/// Write one line per record, replacing the file
pub async fn write_records<T: AsRef<str>>(path: &Path, records: &[T]) -> SourceResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut content = String::with_capacity(records.iter().map(|r| r.as_ref().len() + 1).sum());
    for record in records {
        content.push_str(record.as_ref());
        content.push('\n');
    }

    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), count = records.len(), "wrote records to file");
    Ok(())
}
