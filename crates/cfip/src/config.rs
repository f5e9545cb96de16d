//! Pipeline configuration: the source list and the region keyword table.

use cfip_core::{
    ApiParser, ApiSource, CfipError, HttpMethod, MarkupLayout, RegionTable, Result,
    SourceDescriptor,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use url::Url;

/// Markup sites and their layouts
pub const DEFAULT_MARKUP_SOURCES: [(&str, MarkupLayout); 5] = [
    ("https://cf.090227.xyz/", MarkupLayout::Cf090227),
    ("https://stock.hostmonit.com/CloudFlareYes", MarkupLayout::HostMonit),
    ("https://ip.164746.xyz/", MarkupLayout::Ip164746),
    (
        "https://monitor.gacjie.cn/page/cloudflare/ipv4.html",
        MarkupLayout::Gacjie,
    ),
    ("https://345673.xyz/", MarkupLayout::Site345673),
];

/// Newline-delimited record lists
pub const DEFAULT_TEXT_SOURCES: [&str; 4] = [
    "https://raw.githubusercontent.com/ymyuuu/IPDB/main/BestCF/bestcfv4.txt",
    "https://ipdb.api.030101.xyz/?type=cfv4&country=true&down=true",
    "https://ipdb.api.030101.xyz/?type=bestcf&country=true&down=true",
    "https://raw.githubusercontent.com/OwenDPs/IPDB/main/BestCF/bestcfv4.txt",
];

/// HostMonit optimization API
pub const DEFAULT_API_URL: &str = "https://api.hostmonit.com/get_optimization_ip";

/// Speed-test output left by a local CloudflareST run
pub const DEFAULT_LOCAL_FILE: &str = "CloudflareST/sgcs.txt";

/// Immutable settings for a [`Pipeline`](crate::Pipeline)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sources in fetch/merge order
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceDescriptor>,
    /// Region keyword table
    #[serde(default)]
    pub regions: RegionTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            regions: RegionTable::default(),
        }
    }
}

impl PipelineConfig {
    /// Configuration with an explicit source list and the default region table
    #[must_use]
    pub fn with_sources(sources: Vec<SourceDescriptor>) -> Self {
        Self {
            sources,
            regions: RegionTable::default(),
        }
    }

    /// Check that every remote source has an `http(s)` URL.
    pub fn validate(&self) -> Result<()> {
        for source in &self.sources {
            let url = match source {
                SourceDescriptor::Markup { url, .. } | SourceDescriptor::TextList { url } => url,
                SourceDescriptor::Api(api) => &api.url,
                SourceDescriptor::LocalFile { .. } => continue,
            };
            let parsed = Url::parse(url)
                .map_err(|e| CfipError::Config(format!("invalid source URL {url:?}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(CfipError::Config(format!(
                    "unsupported URL scheme for source {url:?}"
                )));
            }
        }
        Ok(())
    }
}

/// The built-in source list, in order: markup, text lists, API, local file
#[must_use]
pub fn default_sources() -> Vec<SourceDescriptor> {
    let mut sources: Vec<SourceDescriptor> = DEFAULT_MARKUP_SOURCES
        .iter()
        .map(|(url, layout)| SourceDescriptor::markup(*url, *layout))
        .collect();

    sources.extend(DEFAULT_TEXT_SOURCES.iter().map(|url| SourceDescriptor::text_list(*url)));

    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    sources.push(SourceDescriptor::Api(ApiSource {
        url: DEFAULT_API_URL.to_string(),
        method: HttpMethod::Post,
        headers,
        body: Some(json!({"key": "o1zrmHAF", "type": "v4"})),
        parser: ApiParser::HostMonitV1,
    }));

    sources.push(SourceDescriptor::local_file(DEFAULT_LOCAL_FILE));
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfip_core::SourceKind;

    #[test]
    fn test_default_source_order() {
        let config = PipelineConfig::default();
        let kinds: Vec<SourceKind> = config.sources.iter().map(SourceDescriptor::kind).collect();
        assert_eq!(kinds.len(), 11);
        assert!(kinds[..5].iter().all(|k| *k == SourceKind::Markup));
        assert!(kinds[5..9].iter().all(|k| *k == SourceKind::TextList));
        assert_eq!(kinds[9], SourceKind::Api);
        assert_eq!(kinds[10], SourceKind::LocalFile);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"sources": [{"kind": "text_list", "url": "https://example.com/ips.txt"}]}"#,
        )
        .unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.regions, RegionTable::default());

        let empty: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, PipelineConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let config = PipelineConfig::with_sources(vec![SourceDescriptor::text_list("not a url")]);
        assert!(matches!(config.validate(), Err(CfipError::Config(_))));

        let config =
            PipelineConfig::with_sources(vec![SourceDescriptor::text_list("ftp://example.com/x")]);
        assert!(config.validate().is_err());

        let config = PipelineConfig::with_sources(vec![SourceDescriptor::local_file("ips.txt")]);
        assert!(config.validate().is_ok());
    }
}
