//! Shared test support utilities for integration tests

use std::time::Duration;

use cko_core::{CheckoutClient, Config, ConfigOptions};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SANDBOX_SECRET: &str = "sk_test_fb12e3d0-3f5e-4c2b-9a9c-1e2f3a4b5c6d";
pub const NAS_SANDBOX_SECRET: &str = "sk_sbox_m73dzbpy7cf3gfd46xr4yj5xo4e";

/// Resolve a client against the mock server without reading the environment
pub fn client_for(server: &MockServer, credential: &str, options: ConfigOptions) -> CheckoutClient {
    let options = options.with_host(server.uri());
    let config = Config::resolve(Some(credential), &options, |_| None);
    CheckoutClient::with_config(config, &options)
}

/// A static key client pointed at the mock server
pub fn static_key_client(server: &MockServer) -> CheckoutClient {
    client_for(server, SANDBOX_SECRET, ConfigOptions::new())
}

/// An OAuth client whose token endpoint lives on the mock server
pub fn oauth_client(server: &MockServer) -> CheckoutClient {
    let options = ConfigOptions::new()
        .with_client("ack_test_client")
        .with_access_url(format!("{}/connect/token", server.uri()));
    client_for(server, "client_secret", options)
}

/// A static key client with a short request timeout
pub fn client_with_timeout(server: &MockServer, timeout: Duration) -> CheckoutClient {
    client_for(server, SANDBOX_SECRET, ConfigOptions::new().with_timeout(timeout))
}

/// A token endpoint body as the access server returns it
pub fn token_body(token: &str, expires_in: i64) -> Value {
    json!({
        "access_token": token,
        "expires_in": expires_in,
        "token_type": "Bearer",
        "scope": "gateway"
    })
}

/// Mount a token endpoint expected to be hit `times` times
pub async fn mount_token_endpoint(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token, 3600)))
        .expect(times)
        .mount(server)
        .await;
}
