//! Newline-delimited record lists (remote text endpoints and local files).

use cfip_core::Candidate;

/// Every non-blank trimmed line is one record, taken verbatim
#[must_use]
pub fn parse(body: &str) -> Vec<Candidate> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Candidate::parse)
        .collect()
}
