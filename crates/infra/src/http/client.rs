//! reqwest-backed [`Transport`]
//!
//! One `send` is exactly one HTTP exchange: no retries, no redirects to
//! follow on the caller's behalf, no status interpretation. The executor
//! owns all of that.

use std::time::Duration;

use async_trait::async_trait;
use callwire_core::{HttpRequest, RawResponse, Transport, TransportError};
use callwire_domain::{CallwireError, HttpMethod, Result};
use reqwest::{Client as ReqwestClient, Method};
use tracing::debug;

/// HTTP transport over a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns [`CallwireError::Config`] if the TLS backend cannot initialize.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// The underlying client; clones share its connection pool.
    pub fn client(&self) -> &ReqwestClient {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<RawResponse, TransportError> {
        let mut builder = self.client.request(to_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        debug!(method = request.method.as_str(), url = %request.url, "sending HTTP request");

        let response = builder.send().await.map_err(|err| map_error(&err, self.timeout))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|err| map_error(&err, self.timeout))?.to_vec();

        debug!(status, bytes = body.len(), "received HTTP response");
        Ok(RawResponse { status, headers, body })
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_error(err: &reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout(timeout);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return TransportError::Connect(err.to_string());
        }
    }
    TransportError::Other(err.to_string())
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None }
    }
}

impl ReqwestTransportBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// # Errors
    /// Returns [`CallwireError::Config`] if the reqwest client cannot be built.
    pub fn build(self) -> Result<ReqwestTransport> {
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder
            .build()
            .map_err(|err| CallwireError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(ReqwestTransport { client, timeout: self.timeout })
    }
}
