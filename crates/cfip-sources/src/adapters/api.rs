//! JSON API response parsers.

use crate::error::{SourceError, SourceResult};
use cfip_core::{ApiParser, Candidate};
use serde_json::Value;
use tracing::debug;

/// Line groups read from a `HostMonitV1` response, in output order
const LINE_KEYS: [&str; 3] = ["CM", "CT", "CU"];

/// Parse an API response body with the selected parser
pub fn parse(parser: ApiParser, body: &Value) -> SourceResult<Vec<Candidate>> {
    match parser {
        ApiParser::HostMonitV1 => parse_host_monit(body),
    }
}

/// `{"code": 200, "info": {"CM": [{"ip": "..", "speed": ".."}], "CT": [..], "CU": [..]}}`
fn parse_host_monit(body: &Value) -> SourceResult<Vec<Candidate>> {
    let code = body.get("code").and_then(Value::as_i64);
    let info = body.get("info").and_then(Value::as_object);

    let (Some(200), Some(info)) = (code, info) else {
        return Err(SourceError::Format(format!(
            "expected code 200 with an info object, got code {code:?}"
        )));
    };

    let mut records = Vec::new();
    for key in LINE_KEYS {
        let Some(entries) = info.get(key).and_then(Value::as_array) else {
            continue;
        };

        for entry in entries {
            let ip = entry.get("ip").and_then(Value::as_str).map(str::trim);
            let speed = entry.get("speed").and_then(speed_text);
            match (ip, speed) {
                (Some(ip), Some(speed)) if !ip.is_empty() => {
                    records.push(Candidate::with_speed(ip, &speed));
                }
                _ => debug!(line = key, entry = %entry, "skipping incomplete API entry"),
            }
        }
    }

    Ok(records)
}

/// Speeds arrive as either strings or numbers
fn speed_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
