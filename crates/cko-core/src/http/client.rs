//! Request executor
//!
//! Builds authenticated requests against the configured host, races them
//! against the timeout and normalizes the outcome into an [`ApiResponse`] or a
//! mapped [`Error`](crate::Error).

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::http::auth::{mask_secret, public_key_authorization};
use crate::http::error;
use crate::http::timeout::with_timeout;
use crate::http::token::TokenManager;
use crate::http::transport::{HttpTransport, RequestBody, TransportRequest, TransportResponse};
use crate::{Error, Result};

pub const REQUEST_ID_HEADER: &str = "cko-request-id";
pub const API_VERSION_HEADER: &str = "cko-version";
pub const IDEMPOTENCY_KEY_HEADER: &str = "cko-idempotency-key";

const CLIENT_USER_AGENT: &str = concat!("cko-rs/", env!("CARGO_PKG_VERSION"));

/// Normalized successful response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed body, `{}` when the server sent none
    pub json: Value,
    pub headers: HeaderMap,
}

impl ApiResponse {
    /// `Cko-Request-Id` header
    pub fn request_id(&self) -> Option<&str> {
        self.header(REQUEST_ID_HEADER)
    }

    /// `Cko-Version` header
    pub fn version(&self) -> Option<&str> {
        self.header(API_VERSION_HEADER)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Which credential authorizes a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// The client's secret key or OAuth access token
    Secret,
    /// The public key, used for token creation
    PublicKey,
}

/// Executes requests for every resource of a client
#[derive(Debug)]
pub struct HttpClient {
    config: Arc<Config>,
    transport: Arc<dyn HttpTransport>,
    tokens: Option<TokenManager>,
}

impl HttpClient {
    pub fn new(config: Arc<Config>, transport: Arc<dyn HttpTransport>) -> Self {
        let tokens = TokenManager::from_credentials(config.credentials());
        Self {
            config,
            transport,
            tokens,
        }
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Token cache, present only in OAuth mode
    pub fn token_manager(&self) -> Option<&TokenManager> {
        self.tokens.as_ref()
    }

    /// Authorization header value for the given source
    pub async fn authorization(&self, source: AuthSource) -> Result<String> {
        match source {
            AuthSource::PublicKey => Ok(public_key_authorization(&self.config.public_key())),
            AuthSource::Secret => match self.config.credentials().static_authorization() {
                Some(authorization) => Ok(authorization),
                None => match &self.tokens {
                    Some(tokens) => {
                        tokens
                            .authorization(self.transport.as_ref(), self.config.timeout())
                            .await
                    }
                    None => Err(Error::value("OAuth credentials without a token manager")),
                },
            },
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(Method::GET, path, AuthSource::Secret, None, HeaderMap::new())
            .await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        self.request(Method::POST, path, AuthSource::Secret, body, HeaderMap::new())
            .await
    }

    pub async fn put(&self, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        self.request(Method::PUT, path, AuthSource::Secret, body, HeaderMap::new())
            .await
    }

    pub async fn patch(&self, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        self.request(Method::PATCH, path, AuthSource::Secret, body, HeaderMap::new())
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request(Method::DELETE, path, AuthSource::Secret, None, HeaderMap::new())
            .await
    }

    /// Perform one call against `host + path`
    ///
    /// `extra_headers` are applied after the defaults and may override them.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        auth: AuthSource,
        body: Option<Value>,
        extra_headers: HeaderMap,
    ) -> Result<ApiResponse> {
        let url = self.url(path)?;
        let authorization = self.authorization(auth).await?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(AUTHORIZATION, header_value(&authorization)?);
        headers.extend(extra_headers);

        debug!(
            method = %method,
            url = %url,
            auth_mode = ?self.config.auth_mode(),
            authorization = %mask_secret(&authorization),
            "Sending request"
        );

        let request = TransportRequest {
            method,
            url,
            headers,
            body: body.map(RequestBody::Json),
        };

        let response = dispatch(self.transport.as_ref(), request, self.config.timeout()).await?;
        normalize(response)
    }

    /// Absolute URL for a resource path, with or without its leading `/`
    pub fn url(&self, path: &str) -> Result<Url> {
        let host = self.config.host().trim_end_matches('/');
        let path = path.strip_prefix('/').unwrap_or(path);
        let raw = format!("{}/{}", host, path);
        Url::parse(&raw).map_err(|e| Error::Api {
            message: format!("Invalid request URL: {}", raw),
            status_code: None,
            body: None,
            source: Some(anyhow::Error::new(e)),
        })
    }
}

/// Send a request under the timeout; non-2xx responses become errors
pub(crate) async fn dispatch(
    transport: &dyn HttpTransport,
    request: TransportRequest,
    timeout: Duration,
) -> Result<TransportResponse> {
    let method = request.method.clone();
    let url = request.url.clone();

    let response = with_timeout(
        async {
            transport
                .send(request)
                .await
                .map_err(error::from_transport_error)
        },
        timeout,
    )
    .await
    .inspect_err(|e| warn!(method = %method, url = %url, kind = %e.kind(), "Request failed"))?;

    if !(200..300).contains(&response.status) {
        let err = error::from_response(&response);
        warn!(
            method = %method,
            url = %url,
            status = response.status,
            kind = %err.kind(),
            request_id = response
                .headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default(),
            "Request returned an error status"
        );
        return Err(err);
    }

    Ok(response)
}

/// Parse a successful response body
fn normalize(response: TransportResponse) -> Result<ApiResponse> {
    let json = if response.status == 204 || response.body.iter().all(u8::is_ascii_whitespace) {
        json!({})
    } else {
        serde_json::from_slice::<Value>(&response.body)
            .map_err(|e| error::unparseable_body(&response, e))?
    };

    Ok(ApiResponse {
        status: response.status,
        json,
        headers: response.headers,
    })
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        Error::value("Authorization value contains characters not allowed in a header")
    })
}

/// Header map carrying one extra header
pub fn single_header(name: &'static str, value: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(value)
        .map_err(|_| Error::value(format!("Invalid value for header {}", name)))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(headers)
}

/// Append `?k1=v1&k2=v2` in iteration order
///
/// Values are interpolated as-is, without percent-encoding; callers must
/// pre-encode anything that needs it.
pub fn build_query_params<I, K, V>(path: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    let query = params
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}
