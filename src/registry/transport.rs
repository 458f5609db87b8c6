//! Transport seam between the registry client and the network.
//!
//! The client only needs "status code plus body, or a transport error" for
//! an identifier. [`HttpTransport`] does that with reqwest; tests plug in
//! scripted fakes.

use crate::error::Result;
use crate::identifier::Cnpj;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Raw HTTP answer from the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryResponse {
    pub status: u16,
    pub body: String,
}

impl RegistryResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure below the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),
}

/// Fetches the raw registry response for one identifier
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    async fn fetch(&self, cnpj: &Cnpj) -> std::result::Result<RegistryResponse, TransportError>;
}

/// reqwest-backed transport against `{base_url}/{cnpj}`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cnpj-lookup/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, cnpj: &Cnpj) -> String {
        format!("{}/{}", self.base_url, cnpj)
    }
}

#[async_trait]
impl RegistryTransport for HttpTransport {
    async fn fetch(&self, cnpj: &Cnpj) -> std::result::Result<RegistryResponse, TransportError> {
        let url = self.url_for(cnpj);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_reqwest_error)?;

        Ok(RegistryResponse { status, body })
    }
}

fn classify_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(error.to_string())
    }
}
