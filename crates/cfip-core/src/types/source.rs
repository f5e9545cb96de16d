//! Source descriptors: where candidate records come from and how to parse them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Source category, used to select subsets of the configured sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Structured-markup (HTML table) site
    Markup,
    /// Plain-text list endpoint
    TextList,
    /// JSON API endpoint
    Api,
    /// Local line file
    LocalFile,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markup => write!(f, "markup"),
            Self::TextList => write!(f, "text"),
            Self::Api => write!(f, "api"),
            Self::LocalFile => write!(f, "local"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = crate::CfipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markup" | "html" => Ok(Self::Markup),
            "text" | "text_list" | "text-list" => Ok(Self::TextList),
            "api" => Ok(Self::Api),
            "local" | "local_file" | "local-file" | "file" => Ok(Self::LocalFile),
            other => Err(crate::CfipError::Config(format!(
                "unknown source kind: {other} (expected markup, text, api or local)"
            ))),
        }
    }
}

/// Known markup site layouts
///
/// Each layout hard-codes the row selector and column offsets of one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkupLayout {
    /// `cf.090227.xyz`: line, ip, latency
    #[serde(rename = "cf090227")]
    Cf090227,
    /// `stock.hostmonit.com`: `el-table__row` rows with line, ip, latency
    #[serde(rename = "hostmonit")]
    HostMonit,
    /// `ip.164746.xyz`: ip in column 0, latency in column 4, no line tag
    #[serde(rename = "ip164746")]
    Ip164746,
    /// `monitor.gacjie.cn`: line, ip, latency in column 4
    #[serde(rename = "gacjie")]
    Gacjie,
    /// `345673.xyz`: `line-cm`/`line-ct`/`line-cu` rows, latency in column 3
    #[serde(rename = "site345673")]
    Site345673,
}

/// HTTP method for API sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET request
    #[default]
    Get,
    /// POST request with a JSON body
    Post,
}

/// Response parser for API sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiParser {
    /// `{"code":200,"info":{"CM":[{"ip":..,"speed":..}],"CT":[..],"CU":[..]}}`
    #[serde(rename = "api-v1", alias = "hostmonit_api")]
    HostMonitV1,
}

impl FromStr for ApiParser {
    type Err = crate::CfipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "api-v1" | "hostmonit_api" => Ok(Self::HostMonitV1),
            other => Err(crate::CfipError::Config(format!("unknown API parser: {other}"))),
        }
    }
}

/// A JSON API source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSource {
    /// Endpoint URL
    pub url: String,
    /// Request method
    #[serde(default)]
    pub method: HttpMethod,
    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// JSON body (sent with POST)
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    /// Response parser
    pub parser: ApiParser,
}

/// One configured source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDescriptor {
    /// HTML site with a known layout
    Markup {
        /// Page URL
        url: String,
        /// Site layout
        layout: MarkupLayout,
    },
    /// Newline-delimited list of pre-formatted records
    TextList {
        /// List URL
        url: String,
    },
    /// JSON API
    Api(ApiSource),
    /// Local newline-delimited file
    LocalFile {
        /// File path
        path: PathBuf,
    },
}

impl SourceDescriptor {
    /// Markup source
    pub fn markup(url: impl Into<String>, layout: MarkupLayout) -> Self {
        Self::Markup {
            url: url.into(),
            layout,
        }
    }

    /// Text list source
    pub fn text_list(url: impl Into<String>) -> Self {
        Self::TextList { url: url.into() }
    }

    /// Local file source
    pub fn local_file(path: impl Into<PathBuf>) -> Self {
        Self::LocalFile { path: path.into() }
    }

    /// The source's category
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::Markup { .. } => SourceKind::Markup,
            Self::TextList { .. } => SourceKind::TextList,
            Self::Api(_) => SourceKind::Api,
            Self::LocalFile { .. } => SourceKind::LocalFile,
        }
    }

    /// URL or path, for diagnostics
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Markup { url, .. } | Self::TextList { url } => url.clone(),
            Self::Api(api) => api.url.clone(),
            Self::LocalFile { path } => path.display().to_string(),
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("html".parse::<SourceKind>().unwrap(), SourceKind::Markup);
        assert_eq!("Text".parse::<SourceKind>().unwrap(), SourceKind::TextList);
        assert_eq!("local".parse::<SourceKind>().unwrap(), SourceKind::LocalFile);
        assert!("ftp".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_api_parser_names() {
        assert_eq!("api-v1".parse::<ApiParser>().unwrap(), ApiParser::HostMonitV1);
        assert_eq!(
            "hostmonit_api".parse::<ApiParser>().unwrap(),
            ApiParser::HostMonitV1
        );
        assert!("api-v2".parse::<ApiParser>().is_err());
    }

    #[test]
    fn test_descriptor_kind_and_label() {
        let d = SourceDescriptor::markup("https://cf.090227.xyz/", MarkupLayout::Cf090227);
        assert_eq!(d.kind(), SourceKind::Markup);
        assert_eq!(d.label(), "https://cf.090227.xyz/");
        assert_eq!(d.to_string(), "markup https://cf.090227.xyz/");

        let d = SourceDescriptor::local_file("CloudflareST/sgcs.txt");
        assert_eq!(d.kind(), SourceKind::LocalFile);
        assert_eq!(d.label(), "CloudflareST/sgcs.txt");
    }

    #[test]
    fn test_descriptor_deserialize() {
        let json = r#"[
            {"kind": "markup", "url": "https://ip.164746.xyz/", "layout": "ip164746"},
            {"kind": "text_list", "url": "https://example.com/list.txt"},
            {"kind": "api", "url": "https://api.example.com", "method": "POST",
             "headers": {"Content-Type": "application/json"},
             "body": {"key": "k", "type": "v4"}, "parser": "hostmonit_api"},
            {"kind": "local_file", "path": "ips.txt"}
        ]"#;
        let sources: Vec<SourceDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(sources.len(), 4);
        assert_eq!(
            sources[0],
            SourceDescriptor::markup("https://ip.164746.xyz/", MarkupLayout::Ip164746)
        );
        match &sources[2] {
            SourceDescriptor::Api(api) => {
                assert_eq!(api.method, HttpMethod::Post);
                assert_eq!(api.parser, ApiParser::HostMonitV1);
                assert_eq!(api.body.as_ref().unwrap()["type"], "v4");
            }
            other => panic!("expected api source, got {other:?}"),
        }
        assert_eq!(sources[3].kind(), SourceKind::LocalFile);
    }

    #[test]
    fn test_unknown_layout_rejected() {
        let json = r#"{"kind": "markup", "url": "https://x", "layout": "generic"}"#;
        assert!(serde_json::from_str::<SourceDescriptor>(json).is_err());
    }
}
