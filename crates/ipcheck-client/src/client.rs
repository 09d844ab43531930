//! VirusTotal API client implementation.

use async_trait::async_trait;
use ipcheck_core::{IpCheckError, Result, Verdict};
use reqwest::{Client as HttpClient, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::reputation::{IpAddressReport, ReputationCheck};

/// The VirusTotal API base URL
const DEFAULT_BASE_URL: &str = "https://www.virustotal.com";

/// Default whole-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-apikey";

/// Sent on every request
const USER_AGENT: &str = concat!("ipcheck/", env!("CARGO_PKG_VERSION"));

/// VirusTotal reputation client
#[derive(Clone)]
pub struct VirusTotalClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    api_key: String,
    base_url: Url,
    timeout: Duration,
}

impl VirusTotalClient {
    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> VirusTotalClientBuilder {
        VirusTotalClientBuilder::new(api_key)
    }

    /// Fetch the raw IP address report
    pub async fn ip_report(&self, ip: &str) -> Result<IpAddressReport> {
        let url = self.report_url(ip)?;
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.inner.api_key)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "reputation API returned an error");
            return Err(IpCheckError::Api {
                code: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(IpCheckError::Json)
    }

    /// `{base}/api/v3/ip_addresses/{ip}` with the IP as a single encoded segment
    fn report_url(&self, ip: &str) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| IpCheckError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "v3", "ip_addresses", ip]);
        Ok(url)
    }

    fn transport_error(&self, err: &reqwest::Error) -> IpCheckError {
        if err.is_timeout() {
            IpCheckError::Timeout(self.inner.timeout.as_secs())
        } else {
            IpCheckError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl ReputationCheck for VirusTotalClient {
    #[instrument(skip(self), fields(provider = "virustotal"))]
    async fn check(&self, ip: &str) -> Result<Verdict> {
        let report = self.ip_report(ip).await?;
        let stats = report.stats();
        debug!(
            malicious = stats.malicious,
            suspicious = stats.suspicious,
            harmless = stats.harmless,
            "analysis stats"
        );
        Ok(report.verdict())
    }
}

/// Builder for configuring a [`VirusTotalClient`]
pub struct VirusTotalClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl VirusTotalClientBuilder {
    /// Create a new builder with the given API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the whole-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<VirusTotalClient> {
        let base_url =
            Url::parse(&self.base_url).map_err(|e| IpCheckError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(IpCheckError::InvalidUrl(self.base_url));
        }

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| IpCheckError::Http(e.to_string()))?;

        Ok(VirusTotalClient {
            inner: Arc::new(ClientInner {
                http,
                api_key: self.api_key,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}
