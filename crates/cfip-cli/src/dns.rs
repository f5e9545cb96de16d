//! Cloudflare DNS publishing.
//!
//! A thin client for the v4 `dns_records` endpoints, used to replace the A
//! records of one name with freshly selected addresses.

use reqwest::Client as HttpClient;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Cloudflare API v4 root
const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// TTL of created records (seconds)
const RECORD_TTL: u32 = 60;

/// Result type alias for DNS operations
pub type DnsResult<T> = std::result::Result<T, DnsError>;

/// Errors from the Cloudflare API
#[derive(Error, Debug)]
pub enum DnsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Cloudflare returned status {code}: {body}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body
        body: String,
    },

    /// `success: false` in the response envelope
    #[error("Cloudflare API error: {0}")]
    Api(String),

    /// Missing credentials
    #[error("missing Cloudflare setting: {0}")]
    MissingSetting(&'static str),

    /// Refusing to publish an empty address set
    #[error("no addresses to publish")]
    EmptyRecordSet,
}

/// One DNS record as returned by Cloudflare
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    /// Record id
    pub id: String,
    /// Fully qualified name
    pub name: String,
    /// Record type (`A`, `AAAA`, `CNAME`, ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record content (the address for A records)
    pub content: String,
}

#[derive(Debug, Serialize)]
struct NewRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    name: String,
}

/// Outcome of [`CloudflareDns::replace_a_records`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Records removed
    pub deleted: usize,
    /// Records created
    pub created: usize,
    /// Deletions or creations that failed
    pub failed: usize,
}

/// Cloudflare DNS client for one zone
#[derive(Clone)]
pub struct CloudflareDns {
    inner: Arc<DnsInner>,
}

struct DnsInner {
    http: HttpClient,
    token: String,
    zone_id: String,
    base_url: String,
}

impl CloudflareDns {
    /// Create a client for `zone_id` authenticated with `token`
    pub fn new(token: impl Into<String>, zone_id: impl Into<String>) -> DnsResult<Self> {
        Self::with_base_url(token, zone_id, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom API root (useful for testing)
    pub fn with_base_url(
        token: impl Into<String>,
        zone_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> DnsResult<Self> {
        let token = token.into();
        let zone_id = zone_id.into();
        if token.trim().is_empty() {
            return Err(DnsError::MissingSetting("CF_API_KEY"));
        }
        if zone_id.trim().is_empty() {
            return Err(DnsError::MissingSetting("CF_ZONE_ID"));
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            inner: Arc::new(DnsInner {
                http,
                token,
                zone_id,
                base_url: base_url.into().trim_end_matches('/').to_string(),
            }),
        })
    }

    fn zone_url(&self) -> String {
        format!("{}/zones/{}", self.inner.base_url, self.inner.zone_id)
    }

    /// Check the token against the zone and return the zone name
    pub async fn verify_zone(&self) -> DnsResult<String> {
        let request = self.inner.http.get(self.zone_url());
        let zone: Zone = self.send(request).await?;
        Ok(zone.name)
    }

    /// Records with exactly this name
    pub async fn list_records(&self, name: &str) -> DnsResult<Vec<DnsRecord>> {
        let url = format!("{}/dns_records", self.zone_url());
        debug!(url = %url, record = %name, "listing DNS records");
        let request = self.inner.http.get(&url).query(&[("name", name)]);
        self.send(request).await
    }

    /// Delete one record by id
    pub async fn delete_record(&self, id: &str) -> DnsResult<()> {
        let url = format!("{}/dns_records/{id}", self.zone_url());
        debug!(url = %url, "deleting DNS record");
        let _: IgnoredAny = self.send(self.inner.http.delete(&url)).await?;
        Ok(())
    }

    /// Create an unproxied A record with a 60 second TTL
    pub async fn create_a_record(&self, name: &str, ip: &str) -> DnsResult<DnsRecord> {
        let url = format!("{}/dns_records", self.zone_url());
        debug!(url = %url, record = %name, ip = %ip, "creating A record");
        let body = NewRecord {
            record_type: "A",
            name,
            content: ip,
            ttl: RECORD_TTL,
            proxied: false,
        };
        self.send(self.inner.http.post(&url).json(&body)).await
    }

    /// Replace every record of `name` with one A record per address.
    ///
    /// Individual failures are logged and counted; the remaining operations
    /// still run. An empty address list is refused before anything is deleted.
    pub async fn replace_a_records(&self, name: &str, ips: &[String]) -> DnsResult<ReplaceSummary> {
        if ips.is_empty() {
            return Err(DnsError::EmptyRecordSet);
        }

        let mut summary = ReplaceSummary::default();

        for record in self.list_records(name).await? {
            match self.delete_record(&record.id).await {
                Ok(()) => {
                    info!(record = %record.name, content = %record.content, "deleted DNS record");
                    summary.deleted += 1;
                }
                Err(e) => {
                    warn!(id = %record.id, error = %e, "failed to delete DNS record");
                    summary.failed += 1;
                }
            }
        }

        for ip in ips {
            match self.create_a_record(name, ip).await {
                Ok(_) => {
                    info!(record = %name, ip = %ip, "created A record");
                    summary.created += 1;
                }
                Err(e) => {
                    warn!(ip = %ip, error = %e, "failed to create A record");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Verify the credentials against the zone, then replace the records of `name`.
    ///
    /// A rejected token fails here, before any record is touched.
    pub async fn publish(&self, name: &str, ips: &[String]) -> DnsResult<ReplaceSummary> {
        if ips.is_empty() {
            return Err(DnsError::EmptyRecordSet);
        }
        let zone = self.verify_zone().await?;
        info!(zone = %zone, record = %name, count = ips.len(), "publishing A records");
        self.replace_a_records(name, ips).await
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> DnsResult<T> {
        let response = request.bearer_auth(&self.inner.token).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DnsError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| DnsError::Api(format!("malformed response: {e}")))?;

        if !envelope.success {
            let message = envelope
                .errors
                .iter()
                .map(|m| format!("{} ({})", m.message, m.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(DnsError::Api(message));
        }

        envelope
            .result
            .ok_or_else(|| DnsError::Api("response has no result".to_string()))
    }
}
