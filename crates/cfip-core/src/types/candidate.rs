//! The candidate record grammar.
//!
//! Every source produces records in one of four textual shapes:
//!
//! ```text
//! <ip>                      bare address
//! <ip>-<latency>ms          address + latency
//! <ip>#<tag>-<latency>ms    address + line tag + latency
//! <ip>#<speed>mb/s          address + throughput
//! ```
//!
//! Tags are free text and may contain `-`, so metrics are always decoded from the
//! tail of the record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

const LATENCY_SUFFIX: &str = "ms";
const SPEED_SUFFIX: &str = "mb/s";

/// Measurement carried by a candidate record
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Metric {
    /// No metric suffix
    #[default]
    None,
    /// Round-trip latency in milliseconds
    Latency(f64),
    /// Throughput in megabytes per second
    Speed(f64),
    /// A metric suffix is present but its value is not a number
    Unparsed,
}

/// One candidate endpoint record
///
/// Equality and hashing use the exact record text: two records with the same
/// address but different tags or latencies are distinct candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Candidate {
    raw: String,
    ip: String,
    tag: Option<String>,
    metric: Metric,
}

impl Candidate {
    /// Parse a record. Parsing is total; malformed metrics decode as [`Metric::Unparsed`].
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let raw = input.trim().to_string();
        let (ip, tag, metric) = decode(&raw);
        Self {
            raw,
            ip,
            tag,
            metric,
        }
    }

    /// A bare address record
    #[must_use]
    pub fn bare(ip: &str) -> Self {
        Self::parse(ip)
    }

    /// An `<ip>[#tag]-<latency>ms` record; `latency` is written verbatim
    #[must_use]
    pub fn with_latency(ip: &str, tag: Option<&str>, latency: &str) -> Self {
        let ip = ip.trim();
        let latency = latency.trim();
        match tag.map(str::trim).filter(|t| !t.is_empty()) {
            Some(tag) => Self::parse(&format!("{ip}#{tag}-{latency}{LATENCY_SUFFIX}")),
            None => Self::parse(&format!("{ip}-{latency}{LATENCY_SUFFIX}")),
        }
    }

    /// An `<ip>#<speed>mb/s` record; `speed` is written verbatim
    #[must_use]
    pub fn with_speed(ip: &str, speed: &str) -> Self {
        Self::parse(&format!("{}#{}{SPEED_SUFFIX}", ip.trim(), speed.trim()))
    }

    /// The leading address token
    #[must_use]
    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// Line/ISP tag, if present
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Decoded metric
    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Latency in milliseconds, if the record carries a numeric latency
    #[must_use]
    pub const fn latency_ms(&self) -> Option<f64> {
        match self.metric {
            Metric::Latency(ms) => Some(ms),
            _ => None,
        }
    }

    /// Throughput in MB/s, if the record carries a numeric speed
    #[must_use]
    pub const fn speed(&self) -> Option<f64> {
        match self.metric {
            Metric::Speed(speed) => Some(speed),
            _ => None,
        }
    }

    /// The record text exactly as produced by its source (trimmed)
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Extract the bare address from a record.
///
/// Strips everything after the first `#`, otherwise after the first `-`. Returns
/// `None` when nothing is left.
#[must_use]
pub fn extract_ip(record: &str) -> Option<&str> {
    let record = record.trim();
    let head = if let Some((head, _)) = record.split_once('#') {
        head
    } else if let Some((head, _)) = record.split_once('-') {
        head
    } else {
        record
    };
    let head = head.trim();
    (!head.is_empty()).then_some(head)
}

fn decode(raw: &str) -> (String, Option<String>, Metric) {
    let address = extract_ip(raw).unwrap_or_default().to_string();

    if let Some(body) = raw.strip_suffix(SPEED_SUFFIX) {
        let metric = body
            .split_once('#')
            .and_then(|(_, value)| parse_number(value))
            .map_or(Metric::Unparsed, Metric::Speed);
        return (address, None, metric);
    }

    if let Some(body) = raw.strip_suffix(LATENCY_SUFFIX) {
        if let Some((head, value)) = body.rsplit_once('-') {
            if let Some(ms) = parse_number(value) {
                let tag = head.split_once('#').and_then(|(_, tag)| non_empty(tag));
                return (address, tag, Metric::Latency(ms));
            }
        }
        return (address, trailing_tag(raw), Metric::Unparsed);
    }

    (address, trailing_tag(raw), Metric::None)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn trailing_tag(raw: &str) -> Option<String> {
    raw.split_once('#').and_then(|(_, tag)| non_empty(tag))
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Candidate {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Candidate {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Candidate {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Candidate> for String {
    fn from(candidate: Candidate) -> Self {
        candidate.raw
    }
}

impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
