//! Client configuration
//!
//! [`ConfigOptions`] is what callers pass in; [`Config`] is the resolved,
//! shared configuration every request reads. Options that are omitted fall
//! back to `CKO_*` environment variables.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::auth::{self, AuthMode, Classification, Credentials, Scope};
use crate::http::transport::{HttpTransport, TransportKind};

/// Default request timeout (15 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Scope requested when none is configured
pub const DEFAULT_SCOPE: &str = "gateway";

pub const ENV_SECRET_KEY: &str = "CKO_SECRET_KEY";
pub const ENV_PUBLIC_KEY: &str = "CKO_PUBLIC_KEY";
pub const ENV_SECRET: &str = "CKO_SECRET";
pub const ENV_CLIENT: &str = "CKO_CLIENT";
pub const ENV_SCOPE: &str = "CKO_SCOPE";
pub const ENV_ENVIRONMENT: &str = "CKO_ENVIRONMENT";

/// Target environment for OAuth credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    /// Parse an environment name; unknown names yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sandbox" => Some(Environment::Sandbox),
            "prod" | "production" | "live" => Some(Environment::Production),
            _ => None,
        }
    }
}

/// Options recognised when constructing a client
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Explicit API host, overrides the host derived from the credential
    pub host: Option<String>,
    /// Public key, used only for token creation
    pub pk: Option<String>,
    /// Request timeout
    pub timeout: Option<Duration>,
    /// HTTP backend
    pub http_client: TransportKind,
    /// Pre-built reqwest client handed to the default backend
    pub agent: Option<reqwest::Client>,
    /// OAuth client id; its presence selects OAuth mode
    pub client: Option<String>,
    pub scope: Option<Scope>,
    pub environment: Option<Environment>,
    /// Explicit OAuth token endpoint
    pub access_url: Option<String>,
}

impl ConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_public_key(mut self, pk: impl Into<String>) -> Self {
        self.pk = Some(pk.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a custom [`HttpTransport`] instead of the default reqwest backend
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.http_client = TransportKind::Custom(transport);
        self
    }

    pub fn with_agent(mut self, agent: reqwest::Client) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client = Some(client_id.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<Scope>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_access_url(mut self, access_url: impl Into<String>) -> Self {
        self.access_url = Some(access_url.into());
        self
    }
}

/// Resolved configuration shared by every request of a client
///
/// Immutable after construction apart from the public key. The OAuth access
/// token lives in the token manager, not here.
#[derive(Debug)]
pub struct Config {
    credentials: Credentials,
    host: String,
    public_key: RwLock<String>,
    timeout: Duration,
    environment: Option<Environment>,
}

impl Config {
    /// Resolve against the process environment
    pub fn from_env(credential: Option<&str>, options: &ConfigOptions) -> Self {
        Self::resolve(credential, options, |name| std::env::var(name).ok())
    }

    /// Resolve credentials, host and public key
    ///
    /// `env` is consulted only for values the caller did not supply.
    pub fn resolve<F>(credential: Option<&str>, options: &ConfigOptions, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|value| !value.is_empty());
        let mut effective = options.clone();

        let secret = match credential {
            Some(secret) => secret.to_string(),
            None if effective.client.is_some() => lookup(ENV_SECRET).unwrap_or_default(),
            None => match lookup(ENV_SECRET_KEY) {
                Some(secret_key) => secret_key,
                None => match lookup(ENV_CLIENT) {
                    Some(client_id) => {
                        effective.client = Some(client_id);
                        lookup(ENV_SECRET).unwrap_or_default()
                    }
                    None => String::new(),
                },
            },
        };

        if effective.client.is_some() {
            if effective.scope.is_none() {
                effective.scope = lookup(ENV_SCOPE).map(|value| parse_scope(&value));
            }
            if effective.environment.is_none() {
                effective.environment =
                    lookup(ENV_ENVIRONMENT).and_then(|value| Environment::parse(&value));
            }
        }

        let Classification { credentials, host } = auth::classify(&secret, &effective);
        let public_key = effective
            .pk
            .clone()
            .or_else(|| lookup(ENV_PUBLIC_KEY))
            .unwrap_or_default();

        tracing::debug!(
            auth_mode = ?credentials.mode(),
            host = %host,
            "Resolved client configuration"
        );

        Self {
            credentials,
            host,
            public_key: RwLock::new(public_key),
            timeout: effective.timeout.unwrap_or(DEFAULT_TIMEOUT),
            environment: effective.environment,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.credentials.mode()
    }

    /// Base URL requests are sent to
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn environment(&self) -> Option<Environment> {
        self.environment
    }

    pub fn public_key(&self) -> String {
        self.public_key
            .read()
            .map(|pk| pk.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Replace the public key used for token creation
    pub fn set_public_key(&self, public_key: impl Into<String>) {
        let public_key = public_key.into();
        match self.public_key.write() {
            Ok(mut pk) => *pk = public_key,
            Err(poisoned) => *poisoned.into_inner() = public_key,
        }
    }
}

/// `CKO_SCOPE` accepts space or comma separated lists
fn parse_scope(value: &str) -> Scope {
    let scopes: Vec<String> = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    match scopes.len() {
        0 => Scope::default(),
        1 => Scope::Single(scopes[0].clone()),
        _ => Scope::Multiple(scopes),
    }
}
