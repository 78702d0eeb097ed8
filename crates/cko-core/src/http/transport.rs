//! Pluggable HTTP backends
//!
//! The request executor only talks to [`HttpTransport`]. The default backend
//! is reqwest; callers can supply their own implementation through
//! [`TransportKind::Custom`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use url::Url;

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// `application/x-www-form-urlencoded` pairs
    Form(Vec<(String, String)>),
}

/// A fully built request, ready to send
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

/// Raw response as returned by a backend
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Failure below the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Other(String),
}

/// An HTTP backend
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// Send one request and read the full response body
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Which backend a client uses
#[derive(Debug, Clone, Default)]
pub enum TransportKind {
    /// reqwest, optionally with a caller-supplied client
    #[default]
    Default,
    Custom(Arc<dyn HttpTransport>),
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Reuse an existing client (connection pool, proxy, TLS settings)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.json(&body),
            Some(RequestBody::Form(pairs)) => builder.form(&pairs),
            None => builder,
        };

        let response = builder.send().await.map_err(from_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(from_reqwest_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn from_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

/// Build the transport selected by the options
pub fn create_transport(
    kind: &TransportKind,
    agent: Option<reqwest::Client>,
) -> Arc<dyn HttpTransport> {
    match kind {
        TransportKind::Default => match agent {
            Some(client) => Arc::new(ReqwestTransport::with_client(client)),
            None => Arc::new(ReqwestTransport::new()),
        },
        TransportKind::Custom(transport) => transport.clone(),
    }
}
