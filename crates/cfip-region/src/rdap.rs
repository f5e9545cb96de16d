//! RDAP registry lookups over HTTPS.
//!
//! Queries `{base}/ip/{address}` (the `rdap.org` bootstrap redirects to the
//! responsible RIR) and reduces the response to an [`RdapRecord`].

use crate::error::{LookupError, LookupResult};
use crate::lookup::{RdapNetwork, RdapRecord, RegistryLookup};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Public RDAP bootstrap service
const DEFAULT_BASE_URL: &str = "https://rdap.org";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request pacing towards the registry
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst allowance
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_size: 10,
        }
    }
}

impl RateLimitConfig {
    fn quota(self) -> Quota {
        Quota::per_second(NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN))
    }
}

/// RDAP client
#[derive(Clone)]
pub struct RdapClient {
    inner: Arc<RdapInner>,
}

struct RdapInner {
    http: HttpClient,
    base_url: String,
    rate_limiter: DefaultDirectRateLimiter,
}

impl RdapClient {
    /// Create a client with default settings
    pub fn new() -> LookupResult<Self> {
        RdapClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> RdapClientBuilder {
        RdapClientBuilder::new()
    }

    /// Look up one address
    #[instrument(skip(self), fields(registry = %self.inner.base_url))]
    pub async fn lookup_ip(&self, ip: IpAddr) -> LookupResult<RdapRecord> {
        self.inner.rate_limiter.until_ready().await;

        let url = format!("{}/ip/{ip}", self.inner.base_url.trim_end_matches('/'));
        debug!(url = %url, "RDAP request");

        let response = self
            .inner
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/rdap+json, application/json")
            .send()
            .await
            .map_err(|e| map_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            return match status.as_u16() {
                404 => Err(LookupError::NotFound(ip.to_string())),
                429 => {
                    warn!("rate limited by RDAP registry");
                    Err(LookupError::RateLimited)
                }
                code => Err(LookupError::Status(code)),
            };
        }

        let body = response.text().await.map_err(|e| map_reqwest(&e))?;
        let network: IpNetworkObject = serde_json::from_str(&body)?;
        Ok(network.into_record())
    }
}

#[async_trait]
impl RegistryLookup for RdapClient {
    async fn lookup(&self, ip: IpAddr) -> LookupResult<RdapRecord> {
        self.lookup_ip(ip).await
    }
}

fn map_reqwest(err: &reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout
    } else {
        LookupError::Http(err.to_string())
    }
}

/// Builder for configuring an [`RdapClient`]
pub struct RdapClientBuilder {
    base_url: String,
    timeout: Duration,
    rate_limit: RateLimitConfig,
    user_agent: String,
}

impl Default for RdapClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RdapClientBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            rate_limit: RateLimitConfig::default(),
            user_agent: format!("cfip/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the registry base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set request pacing
    #[must_use]
    pub const fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> LookupResult<RdapClient> {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| LookupError::Http(e.to_string()))?;

        Ok(RdapClient {
            inner: Arc::new(RdapInner {
                http,
                base_url: self.base_url,
                rate_limiter: RateLimiter::direct(self.rate_limit.quota()),
            }),
        })
    }
}

// ============================================================================
// RDAP response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct IpNetworkObject {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    entities: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
struct Entity {
    #[serde(default, rename = "vcardArray")]
    vcard_array: Option<Value>,
    #[serde(default)]
    entities: Vec<Entity>,
}

impl IpNetworkObject {
    fn into_record(self) -> RdapRecord {
        let mut contact_addresses = Vec::new();
        collect_addresses(&self.entities, &mut contact_addresses);

        RdapRecord {
            network: Some(RdapNetwork {
                country: self.country.filter(|c| !c.trim().is_empty()),
                name: self.name,
            }),
            contact_addresses,
        }
    }
}

fn collect_addresses(entities: &[Entity], out: &mut Vec<String>) {
    for entity in entities {
        if let Some(vcard) = &entity.vcard_array {
            out.extend(vcard_addresses(vcard));
        }
        collect_addresses(&entity.entities, out);
    }
}

/// Postal addresses of a jCard: `["vcard", [[name, params, type, value], ...]]`.
///
/// Each `adr` property contributes its `label` parameter and its structured
/// components joined by `, `.
fn vcard_addresses(vcard: &Value) -> Vec<String> {
    let Some(properties) = vcard.get(1).and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut addresses = Vec::new();
    for property in properties {
        if property.get(0).and_then(Value::as_str) != Some("adr") {
            continue;
        }

        if let Some(label) = property
            .get(1)
            .and_then(|params| params.get("label"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|l| !l.is_empty())
        {
            addresses.push(label.to_string());
        }

        let mut parts = Vec::new();
        if let Some(value) = property.get(3) {
            flatten_strings(value, &mut parts);
        }
        if !parts.is_empty() {
            addresses.push(parts.join(", "));
        }
    }
    addresses
}

fn flatten_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.trim().is_empty() => out.push(s.trim().to_string()),
        Value::Array(items) => items.iter().for_each(|item| flatten_strings(item, out)),
        _ => {}
    }
}
