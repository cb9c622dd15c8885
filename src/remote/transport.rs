//! Outbound transport.
//!
//! The adapter only needs "fetch this URL, give me JSON". The HTTP client is
//! one implementation; tests plug in stubs.

use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;
use url::Url;

use crate::remote::pending::CorrelationToken;

/// Header carrying the correlation token on outbound requests.
pub const CORRELATION_HEADER: &str = "x-request-id";

/// Transport-level failure. Always surfaced as a connection error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Performs one request/response exchange.
pub trait Transport: Send + Sync + 'static {
    fn fetch(
        &self,
        endpoint: Url,
        token: CorrelationToken,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

/// HTTP transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, endpoint: Url, token: CorrelationToken) -> Result<Value, TransportError> {
        let mut request = self
            .client
            .get(endpoint)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&token.to_string()) {
            request = request.header(CORRELATION_HEADER, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
