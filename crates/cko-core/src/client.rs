//! Client entry point
//!
//! A [`CheckoutClient`] resolves its configuration once and hands a shared
//! [`HttpClient`] to every resource.

use std::sync::Arc;

use crate::config::{Config, ConfigOptions};
use crate::http::auth::AuthMode;
use crate::http::transport::create_transport;
use crate::http::HttpClient;
use crate::resources::{Payments, Tokens, Webhooks};

#[derive(Debug, Clone)]
pub struct CheckoutClient {
    http: Arc<HttpClient>,
    pub payments: Payments,
    pub tokens: Tokens,
    pub webhooks: Webhooks,
}

impl CheckoutClient {
    /// Create a client from an explicit credential
    ///
    /// `credential` is a secret key, or the client secret when
    /// [`ConfigOptions::client`] is set. Omitted values fall back to the
    /// `CKO_*` environment variables. Never fails: an unusable credential
    /// surfaces as an authentication error on the first call.
    pub fn new(credential: Option<&str>, options: ConfigOptions) -> Self {
        let config = Config::from_env(credential, &options);
        Self::with_config(config, &options)
    }

    /// Load `.env` if present, then resolve everything from the environment
    pub fn from_env(options: ConfigOptions) -> Self {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }
        Self::new(None, options)
    }

    /// Build from an already resolved configuration
    pub fn with_config(config: Config, options: &ConfigOptions) -> Self {
        let transport = create_transport(&options.http_client, options.agent.clone());
        let http = Arc::new(HttpClient::new(Arc::new(config), transport));

        Self {
            payments: Payments::new(http.clone()),
            tokens: Tokens::new(http.clone()),
            webhooks: Webhooks::new(http.clone()),
            http,
        }
    }

    pub fn config(&self) -> &Config {
        self.http.config()
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.config().auth_mode()
    }

    /// Shared executor, for calling endpoints without a dedicated resource
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }
}
