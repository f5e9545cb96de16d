//! Pure record filters: deduplication, latency retention and address extraction.

use crate::{extract_ip, Candidate, Metric};
use std::collections::HashSet;
use tracing::debug;

/// Record counts observed by [`dedup_with_stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupStats {
    /// Records before deduplication
    pub before: usize,
    /// Records after deduplication
    pub after: usize,
}

impl DedupStats {
    /// Number of records removed
    #[must_use]
    pub const fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Remove byte-identical duplicates. Output order is unspecified.
#[must_use]
pub fn dedup(records: Vec<Candidate>) -> Vec<Candidate> {
    dedup_with_stats(records).0
}

/// [`dedup`], also returning before/after counts
#[must_use]
pub fn dedup_with_stats(records: Vec<Candidate>) -> (Vec<Candidate>, DedupStats) {
    let before = records.len();
    let unique: HashSet<Candidate> = records.into_iter().collect();
    let unique: Vec<Candidate> = unique.into_iter().collect();
    let stats = DedupStats {
        before,
        after: unique.len(),
    };
    debug!(before = stats.before, after = stats.after, "deduplicated records");
    (unique, stats)
}

/// Retain records by latency.
///
/// - numeric latency: kept iff strictly below `max_ms`
/// - numeric speed: always kept
/// - no metric or an unparseable one: kept iff `keep_no_latency`
#[must_use]
pub fn filter_by_latency(
    records: Vec<Candidate>,
    max_ms: f64,
    keep_no_latency: bool,
) -> Vec<Candidate> {
    let before = records.len();
    let mut no_latency = 0usize;

    let kept: Vec<Candidate> = records
        .into_iter()
        .filter(|record| match record.metric() {
            Metric::Latency(ms) => ms < max_ms,
            Metric::Speed(_) => true,
            Metric::None | Metric::Unparsed => {
                no_latency += 1;
                keep_no_latency
            }
        })
        .collect();

    debug!(
        before,
        after = kept.len(),
        max_ms,
        no_latency,
        keep_no_latency,
        "latency filter applied"
    );
    kept
}

/// Bare addresses of `records`, in input order, with empty results dropped
#[must_use]
pub fn extract_addresses(records: &[Candidate]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| extract_ip(record.as_str()))
        .map(str::to_string)
        .collect()
}
