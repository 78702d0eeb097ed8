//! Credential classification
//!
//! Decides once, at construction time, which authentication scheme a
//! credential uses and which API host it targets:
//! - OAuth client credentials (a `client` option is present)
//! - NAS static keys (`sk_sbox_…` / `sk_…`, sent as `Bearer <key>`)
//! - Legacy static keys (sent verbatim)
//!
//! The precedence is fixed: the `client` option wins over any key pattern.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigOptions, Environment, DEFAULT_SCOPE};

pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.checkout.com";
pub const LIVE_BASE_URL: &str = "https://api.checkout.com";
pub const SANDBOX_ACCESS_URL: &str = "https://access.sandbox.checkout.com/connect/token";
pub const LIVE_ACCESS_URL: &str = "https://access.checkout.com/connect/token";

const BEARER_PREFIX: &str = "Bearer ";

static NAS_LIVE_SECRET_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(Bearer\s)?sk_[a-z2-7]{26}[a-z2-7*#$=]$").ok());

static NAS_SANDBOX_SECRET_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(Bearer\s)?sk_sbox_[a-z2-7]{26}[a-z2-7*#$=]$").ok());

static NAS_LIVE_PUBLIC_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(Bearer\s)?pk_[a-z2-7]{26}[a-z2-7*#$=]$").ok());

static NAS_SANDBOX_PUBLIC_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(Bearer\s)?pk_sbox_[a-z2-7]{26}[a-z2-7*#$=]$").ok());

// Legacy live keys: sk_ followed by a UUID
static LIVE_SECRET_KEY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^sk_?(\w{8})-(\w{4})-(\w{4})-(\w{4})-(\w{12})$").ok()
});

fn matches(pattern: &LazyLock<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

/// Authentication scheme resolved for a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    /// Legacy secret key used verbatim
    StaticKey,
    /// NAS secret key sent with a `Bearer ` prefix
    NasStaticKey,
    /// Client id/secret exchanged for a short-lived access token
    OAuth,
}

/// OAuth scope, either a single value or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scope {
    Single(String),
    Multiple(Vec<String>),
}

impl Scope {
    /// Value sent in the `scope` form field, lists are space separated
    pub fn to_form_value(&self) -> String {
        match self {
            Scope::Single(scope) => scope.clone(),
            Scope::Multiple(scopes) => scopes.join(" "),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Single(DEFAULT_SCOPE.to_string())
    }
}

impl From<&str> for Scope {
    fn from(scope: &str) -> Self {
        Scope::Single(scope.to_string())
    }
}

impl From<Vec<String>> for Scope {
    fn from(scopes: Vec<String>) -> Self {
        Scope::Multiple(scopes)
    }
}

/// Resolved credentials, tagged by authentication scheme
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    StaticKey {
        secret: String,
    },
    NasStaticKey {
        secret: String,
    },
    OAuth {
        client_id: String,
        client_secret: String,
        scope: Scope,
        access_url: String,
    },
}

impl Credentials {
    pub fn mode(&self) -> AuthMode {
        match self {
            Credentials::StaticKey { .. } => AuthMode::StaticKey,
            Credentials::NasStaticKey { .. } => AuthMode::NasStaticKey,
            Credentials::OAuth { .. } => AuthMode::OAuth,
        }
    }

    /// Authorization header value for static keys; `None` in OAuth mode
    pub fn static_authorization(&self) -> Option<String> {
        match self {
            Credentials::StaticKey { secret } => Some(secret.clone()),
            Credentials::NasStaticKey { secret } => Some(with_bearer_prefix(secret)),
            Credentials::OAuth { .. } => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::StaticKey { secret } => f
                .debug_struct("StaticKey")
                .field("secret", &mask_secret(secret))
                .finish(),
            Credentials::NasStaticKey { secret } => f
                .debug_struct("NasStaticKey")
                .field("secret", &mask_secret(secret))
                .finish(),
            Credentials::OAuth {
                client_id,
                client_secret,
                scope,
                access_url,
            } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .field("client_secret", &mask_secret(client_secret))
                .field("scope", scope)
                .field("access_url", access_url)
                .finish(),
        }
    }
}

/// Outcome of classifying a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub credentials: Credentials,
    pub host: String,
}

/// Classify a credential against the (already environment-merged) options
///
/// Total and side-effect free: every input yields a classification, malformed
/// credentials fall through to [`AuthMode::StaticKey`] against the sandbox.
pub fn classify(secret: &str, options: &ConfigOptions) -> Classification {
    let (credentials, derived_host) = if let Some(client_id) = &options.client {
        let live = options.environment == Some(Environment::Production);
        let default_access_url = if live {
            LIVE_ACCESS_URL
        } else {
            SANDBOX_ACCESS_URL
        };
        let access_url = options
            .access_url
            .clone()
            .unwrap_or_else(|| default_access_url.to_string());
        let credentials = Credentials::OAuth {
            client_id: client_id.clone(),
            client_secret: secret.to_string(),
            scope: options.scope.clone().unwrap_or_default(),
            access_url,
        };
        (credentials, host_for(live))
    } else if is_nas_secret_key(secret) {
        let credentials = Credentials::NasStaticKey {
            secret: secret.to_string(),
        };
        (credentials, host_for(matches(&NAS_LIVE_SECRET_KEY, secret)))
    } else {
        let credentials = Credentials::StaticKey {
            secret: secret.to_string(),
        };
        (credentials, host_for(matches(&LIVE_SECRET_KEY, secret)))
    };

    Classification {
        credentials,
        host: options.host.clone().unwrap_or(derived_host),
    }
}

fn host_for(live: bool) -> String {
    let host = if live { LIVE_BASE_URL } else { SANDBOX_BASE_URL };
    host.to_string()
}

/// Whether the value is a NAS secret key (live or sandbox)
pub fn is_nas_secret_key(value: &str) -> bool {
    matches(&NAS_LIVE_SECRET_KEY, value) || matches(&NAS_SANDBOX_SECRET_KEY, value)
}

/// Whether the value is a NAS public key (live or sandbox)
pub fn is_nas_public_key(value: &str) -> bool {
    matches(&NAS_LIVE_PUBLIC_KEY, value) || matches(&NAS_SANDBOX_PUBLIC_KEY, value)
}

/// Authorization value for a public key
pub fn public_key_authorization(public_key: &str) -> String {
    if is_nas_public_key(public_key) {
        with_bearer_prefix(public_key)
    } else {
        public_key.to_string()
    }
}

/// Prefix with `Bearer ` unless the value already carries it
///
/// An existing prefix may use any whitespace separator, as the key patterns
/// accept; it is normalized to a single space.
pub fn with_bearer_prefix(value: &str) -> String {
    let token = value
        .strip_prefix(BEARER_PREFIX.trim_end())
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(str::trim_start)
        .unwrap_or(value);
    format!("{}{}", BEARER_PREFIX, token)
}

/// Mask a secret for logs, keeping a short prefix
pub fn mask_secret(secret: &str) -> String {
    let visible = secret.char_indices().nth(8).map(|(idx, _)| idx);
    match visible {
        Some(idx) if secret.len() > 12 => format!("{}****", &secret[..idx]),
        _ => "*".repeat(secret.chars().count()),
    }
}
