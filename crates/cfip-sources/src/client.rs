//! HTTP client that fetches and parses configured sources.

use crate::adapters::{api, local, markup, text};
use crate::error::{SourceError, SourceResult};
use cfip_core::{ApiSource, Candidate, HttpMethod, SourceDescriptor};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Several list sites reject non-browser agents
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetches sources and turns them into candidate records
#[derive(Clone)]
pub struct SourceClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
}

impl SourceClient {
    /// Create a client with default settings
    pub fn new() -> SourceResult<Self> {
        SourceClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> SourceClientBuilder {
        SourceClientBuilder::new()
    }

    /// Fetch and parse one source.
    ///
    /// Never fails: any network, status, parse or I/O error is logged and yields
    /// an empty list.
    #[instrument(skip(self, descriptor), fields(kind = %descriptor.kind(), source = %descriptor.label()))]
    pub async fn fetch_and_parse(&self, descriptor: &SourceDescriptor) -> Vec<Candidate> {
        match self.try_fetch(descriptor).await {
            Ok(records) => {
                info!(count = records.len(), "fetched source");
                records
            }
            Err(e) => {
                warn!(error = %e, "source failed, skipping");
                Vec::new()
            }
        }
    }

    /// Fetch and parse one source, surfacing the failure
    pub async fn try_fetch(&self, descriptor: &SourceDescriptor) -> SourceResult<Vec<Candidate>> {
        match descriptor {
            SourceDescriptor::Markup { url, layout } => {
                let body = self.get_text(url).await?;
                markup::parse(*layout, &body)
            }
            SourceDescriptor::TextList { url } => {
                let body = self.get_text(url).await?;
                Ok(text::parse(&body))
            }
            SourceDescriptor::Api(source) => {
                let body = self.request_json(source).await?;
                api::parse(source.parser, &body)
            }
            SourceDescriptor::LocalFile { path } => local::read(path).await,
        }
    }

    /// Perform a GET request and return the body text
    pub(crate) async fn get_text(&self, url: &str) -> SourceResult<String> {
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(&e, url))?;

        Self::handle_response(response, url).await
    }

    /// Perform an API request and parse the JSON body
    pub(crate) async fn request_json(&self, source: &ApiSource) -> SourceResult<serde_json::Value> {
        let url = source.url.as_str();
        let mut request = match source.method {
            HttpMethod::Get => {
                debug!(url = %url, "GET API request");
                self.inner.http.get(url)
            }
            HttpMethod::Post => {
                debug!(url = %url, "POST API request");
                self.inner.http.post(url)
            }
        };

        for (name, value) in &source.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if source.method == HttpMethod::Post {
            let body = source
                .body
                .clone()
                .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(&e, url))?;

        let body = Self::handle_response(response, url).await?;
        serde_json::from_str(&body).map_err(SourceError::Json)
    }

    /// Return the body of a successful response, or a status error
    async fn handle_response(response: reqwest::Response, url: &str) -> SourceResult<String> {
        let status = response.status();

        if status.is_success() {
            response
                .text()
                .await
                .map_err(|e| SourceError::from_reqwest(&e, url))
        } else {
            Err(SourceError::Status {
                code: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

#[async_trait::async_trait]
impl crate::SourceFetcher for SourceClient {
    async fn fetch(&self, descriptor: &SourceDescriptor) -> Vec<Candidate> {
        self.fetch_and_parse(descriptor).await
    }
}

/// Builder for configuring a [`SourceClient`]
pub struct SourceClientBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for SourceClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceClientBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> SourceResult<SourceClient> {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        Ok(SourceClient {
            inner: Arc::new(ClientInner { http }),
        })
    }
}
