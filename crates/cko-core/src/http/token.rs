//! OAuth access token lifecycle
//!
//! In OAuth mode every request needs a bearer token obtained from the token
//! endpoint with the client credentials grant. Tokens are cached with their
//! expiry and refreshed lazily: the first request that finds the cache empty or
//! expired issues a new token, everything else reuses the cached one.
//!
//! Refreshes are coalesced. The cache sits behind an async mutex held across
//! the issuance call, so callers racing on an expired token wait for a single
//! refresh instead of each issuing their own. The cached value is only ever
//! replaced whole.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::http::auth::{mask_secret, with_bearer_prefix, Credentials, Scope};
use crate::http::client::dispatch;
use crate::http::transport::{HttpTransport, RequestBody, TransportRequest};
use crate::{Error, Result};

/// A cached bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// Instant after which the token must not be used
    pub expires: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires
    }

    pub fn is_expired(&self) -> bool {
        !self.is_valid_at(Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &mask_secret(&self.token))
            .field("expires", &self.expires)
            .finish()
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
}

/// Issues, caches and refreshes OAuth access tokens
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    scope: Scope,
    access_url: String,
    cache: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: Scope,
        access_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope,
            access_url: access_url.into(),
            cache: Mutex::new(None),
        }
    }

    /// A manager for OAuth credentials, `None` for static keys
    pub fn from_credentials(credentials: &Credentials) -> Option<Self> {
        match credentials {
            Credentials::OAuth {
                client_id,
                client_secret,
                scope,
                access_url,
            } => Some(Self::new(
                client_id.clone(),
                client_secret.clone(),
                scope.clone(),
                access_url.clone(),
            )),
            _ => None,
        }
    }

    /// Snapshot of the cached token
    pub async fn access_token(&self) -> Option<AccessToken> {
        self.cache.lock().await.clone()
    }

    /// Replace the cached token
    pub async fn set_access_token(&self, token: Option<AccessToken>) {
        *self.cache.lock().await = token;
    }

    /// `Bearer <token>`, issuing a new token first when needed
    pub async fn authorization(
        &self,
        transport: &dyn HttpTransport,
        timeout: Duration,
    ) -> Result<String> {
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref().filter(|t| t.is_valid_at(Utc::now())) {
            debug!("Reusing cached access token");
            return Ok(with_bearer_prefix(&token.token));
        }

        let token = self.issue(transport, timeout).await?;
        let authorization = with_bearer_prefix(&token.token);
        *cache = Some(token);
        Ok(authorization)
    }

    async fn issue(&self, transport: &dyn HttpTransport, timeout: Duration) -> Result<AccessToken> {
        let url = Url::parse(&self.access_url).map_err(|e| Error::Api {
            message: format!("Invalid access URL: {}", self.access_url),
            status_code: None,
            body: None,
            source: Some(anyhow::Error::new(e)),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let request = TransportRequest {
            method: Method::POST,
            url,
            headers,
            body: Some(RequestBody::Form(vec![
                ("grant_type".to_string(), "client_credentials".to_string()),
                ("client_id".to_string(), self.client_id.clone()),
                ("client_secret".to_string(), self.client_secret.clone()),
                ("scope".to_string(), self.scope.to_form_value()),
            ])),
        };

        debug!(
            access_url = %self.access_url,
            client_id = %self.client_id,
            "Requesting access token"
        );
        let response = dispatch(transport, request, timeout).await?;
        let issued: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| crate::http::error::unparseable_body(&response, e))?;

        let expires = expiry_after(Utc::now(), issued.expires_in);
        let token = AccessToken::new(issued.access_token, expires);

        info!(
            expires = %token.expires,
            token = %mask_secret(&token.token),
            scope = issued.scope.as_deref().unwrap_or_default(),
            "Issued OAuth access token"
        );
        Ok(token)
    }
}

/// Expiry instant for a lifetime in seconds, saturating at the representable range
fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    let bound = if expires_in > 0 {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    };
    TimeDelta::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(bound)
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("client_id", &self.client_id)
            .field("client_secret", &mask_secret(&self.client_secret))
            .field("scope", &self.scope)
            .field("access_url", &self.access_url)
            .finish()
    }
}
