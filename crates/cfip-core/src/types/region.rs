//! Region codes and the keyword table used to classify registry results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Asian regions commonly targeted together
pub const ASIA_REGIONS: [&str; 11] = [
    "SG", "TW", "JP", "HK", "KR", "TH", "MY", "ID", "PH", "VN", "IN",
];

/// Short uppercase region code (e.g. `SG`, `TW`, `JP`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RegionCode(String);

impl RegionCode {
    /// Create a region code, normalizing to trimmed uppercase
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// The code as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RegionCode {
    type Err = crate::CfipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(crate::CfipError::Config(format!("invalid region code: {s:?}")));
        }
        Ok(Self::new(code))
    }
}

impl From<&str> for RegionCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RegionCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<RegionCode> for String {
    fn from(code: RegionCode) -> Self {
        code.0
    }
}

/// One region and its match keywords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Region code
    pub code: RegionCode,
    /// Case-insensitive keywords (native, English and local names)
    pub keywords: Vec<String>,
}

impl Region {
    /// Create a region entry
    pub fn new(code: impl AsRef<str>, keywords: &[&str]) -> Self {
        Self {
            code: RegionCode::new(code),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

/// Ordered region keyword table
///
/// Scans run in declared order and the first matching region wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    /// Build a table from explicit entries
    #[must_use]
    pub const fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Entries in declared order
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Find the first region with a keyword contained in `text` (case-insensitive)
    #[must_use]
    pub fn match_text(&self, text: &str) -> Option<&RegionCode> {
        let haystack = text.to_lowercase();
        if haystack.trim().is_empty() {
            return None;
        }
        self.regions
            .iter()
            .find(|region| {
                region
                    .keywords
                    .iter()
                    .any(|kw| !kw.is_empty() && haystack.contains(&kw.to_lowercase()))
            })
            .map(|region| &region.code)
    }

    /// Resolve an ISO country code to the table's code for it.
    ///
    /// `GB` resolves to `UK` because `UK` lists `GB` as a keyword. Codes with no
    /// exact keyword match are returned uppercased.
    #[must_use]
    pub fn resolve_country(&self, country: &str) -> RegionCode {
        let country = country.trim();
        self.regions
            .iter()
            .find(|region| {
                region.code.as_str().eq_ignore_ascii_case(country)
                    || region.keywords.iter().any(|kw| kw.eq_ignore_ascii_case(country))
            })
            .map_or_else(|| RegionCode::new(country), |region| region.code.clone())
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new(vec![
            Region::new("SG", &["SG", "Singapore", "新加坡", "singapore"]),
            Region::new("TW", &["TW", "Taiwan", "台湾", "臺灣", "taiwan"]),
            Region::new("JP", &["JP", "Japan", "日本", "japan"]),
            Region::new("HK", &["HK", "Hong Kong", "香港", "hongkong", "hong kong"]),
            Region::new("KR", &["KR", "Korea", "韩国", "南韩", "korea", "south korea"]),
            Region::new("US", &["US", "United States", "美国", "america", "usa"]),
            Region::new("UK", &["UK", "GB", "United Kingdom", "英国", "britain"]),
            Region::new("DE", &["DE", "Germany", "德国", "deutschland"]),
            Region::new("FR", &["FR", "France", "法国", "france"]),
            Region::new("CA", &["CA", "Canada", "加拿大", "canada"]),
            Region::new("AU", &["AU", "Australia", "澳大利亚", "australia"]),
            Region::new("IN", &["IN", "India", "印度", "india"]),
            Region::new("TH", &["TH", "Thailand", "泰国", "thailand"]),
            Region::new("MY", &["MY", "Malaysia", "马来西亚", "malaysia"]),
            Region::new("ID", &["ID", "Indonesia", "印尼", "indonesia"]),
            Region::new("PH", &["PH", "Philippines", "菲律宾", "philippines"]),
            Region::new("VN", &["VN", "Vietnam", "越南", "vietnam"]),
            Region::new("RU", &["RU", "Russia", "俄罗斯", "russia"]),
            Region::new("BR", &["BR", "Brazil", "巴西", "brazil"]),
            Region::new("NL", &["NL", "Netherlands", "荷兰", "netherlands"]),
            Region::new("CH", &["CH", "Switzerland", "瑞士", "switzerland"]),
            Region::new("SE", &["SE", "Sweden", "瑞典", "sweden"]),
            Region::new("NO", &["NO", "Norway", "挪威", "norway"]),
            Region::new("FI", &["FI", "Finland", "芬兰", "finland"]),
            Region::new("DK", &["DK", "Denmark", "丹麦", "denmark"]),
        ])
    }
}
