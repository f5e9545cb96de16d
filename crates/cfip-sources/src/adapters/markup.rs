//! HTML table parsers for the known markup sites.
//!
//! Every site publishes a table of measured endpoints. Column offsets and row
//! filters are fixed per layout; rows whose latency cell does not start with a
//! number are skipped.

use crate::error::{SourceError, SourceResult};
use cfip_core::{Candidate, MarkupLayout};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Numeric prefix, optionally followed by a unit (`ms` or `毫秒`)
const LATENCY_PATTERN: &str = r"^(\d+(?:\.\d+)?)\s*(?:ms|毫秒)?";

/// Row and column positions of one site's table
#[derive(Debug, Clone, Copy)]
struct LayoutSpec {
    /// Rows must carry a class containing one of these (empty: any row)
    row_classes: &'static [&'static str],
    min_cells: usize,
    tag: Option<usize>,
    ip: usize,
    latency: usize,
}

const fn layout_spec(layout: MarkupLayout) -> LayoutSpec {
    match layout {
        MarkupLayout::Cf090227 => LayoutSpec {
            row_classes: &[],
            min_cells: 3,
            tag: Some(0),
            ip: 1,
            latency: 2,
        },
        MarkupLayout::HostMonit => LayoutSpec {
            row_classes: &["el-table__row"],
            min_cells: 3,
            tag: Some(0),
            ip: 1,
            latency: 2,
        },
        MarkupLayout::Ip164746 => LayoutSpec {
            row_classes: &[],
            min_cells: 5,
            tag: None,
            ip: 0,
            latency: 4,
        },
        MarkupLayout::Gacjie => LayoutSpec {
            row_classes: &[],
            min_cells: 5,
            tag: Some(0),
            ip: 1,
            latency: 4,
        },
        MarkupLayout::Site345673 => LayoutSpec {
            row_classes: &["line-cm", "line-ct", "line-cu"],
            min_cells: 4,
            tag: Some(0),
            ip: 1,
            latency: 3,
        },
    }
}

/// Parse an HTML page laid out as `layout`
pub fn parse(layout: MarkupLayout, html: &str) -> SourceResult<Vec<Candidate>> {
    let spec = layout_spec(layout);
    let rows = selector("tr")?;
    let cells = selector("td")?;
    let latency = Regex::new(LATENCY_PATTERN).map_err(|e| SourceError::Format(e.to_string()))?;

    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for row in document.select(&rows) {
        if !row_matches(&row, spec.row_classes) {
            continue;
        }

        let texts: Vec<String> = row.select(&cells).map(|td| cell_text(&td)).collect();
        if texts.len() < spec.min_cells {
            continue;
        }

        let ip = texts[spec.ip].as_str();
        if ip.is_empty() {
            continue;
        }

        let Some(value) = latency
            .captures(&texts[spec.latency])
            .and_then(|caps| caps.get(1))
        else {
            continue;
        };

        let tag = spec.tag.map(|i| texts[i].as_str());
        records.push(Candidate::with_latency(ip, tag, value.as_str()));
    }

    Ok(records)
}

fn selector(css: &str) -> SourceResult<Selector> {
    Selector::parse(css).map_err(|e| SourceError::Format(format!("selector {css:?}: {e}")))
}

fn row_matches(row: &ElementRef<'_>, wanted: &[&str]) -> bool {
    wanted.is_empty()
        || row
            .value()
            .classes()
            .any(|class| wanted.iter().any(|w| class.contains(w)))
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
