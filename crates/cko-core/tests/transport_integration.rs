//! End-to-end tests of the request layer against a mock HTTP server

mod test_support;

use std::time::Duration;

use cko_core::{AuthMode, CheckoutClient, Config, ConfigOptions, ErrorKind};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_static_key_payment_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .and(header("authorization", test_support::SANDBOX_SECRET))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "x"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_support::static_key_client(&server);
    assert_eq!(client.auth_mode(), AuthMode::StaticKey);

    let payment = client
        .payments
        .request(&json!({"amount": 100, "currency": "GBP"}), None)
        .await
        .unwrap();

    assert_eq!(payment, json!({"id": "x"}));
}

#[tokio::test]
async fn test_nas_key_sends_bearer_prefix() {
    let server = MockServer::start().await;
    let expected = format!("Bearer {}", test_support::NAS_SANDBOX_SECRET);
    Mock::given(method("GET"))
        .and(path("/payments/pay_1"))
        .and(header("authorization", expected.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "pay_1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_support::client_for(
        &server,
        test_support::NAS_SANDBOX_SECRET,
        ConfigOptions::new(),
    );
    assert_eq!(client.auth_mode(), AuthMode::NasStaticKey);

    let payment = client.payments.get("pay_1").await.unwrap();
    assert_eq!(payment["id"], "pay_1");
}

#[tokio::test]
async fn test_oauth_token_issued_once_for_two_calls() {
    let server = MockServer::start().await;
    test_support::mount_token_endpoint(&server, "t1", 1).await;
    Mock::given(method("GET"))
        .and(path("/webhooks"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_support::oauth_client(&server);
    assert_eq!(client.auth_mode(), AuthMode::OAuth);

    client.webhooks.retrieve_webhooks().await.unwrap();
    client.webhooks.retrieve_webhooks().await.unwrap();

    let cached = client
        .http()
        .token_manager()
        .unwrap()
        .access_token()
        .await
        .unwrap();
    assert_eq!(cached.token, "t1");
    assert!(!cached.is_expired());
}

#[tokio::test]
async fn test_oauth_token_request_is_form_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=ack_test_client"))
        .and(body_string_contains("scope=gateway"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(test_support::token_body("t1", 3600)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/webhooks/wh_1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = test_support::oauth_client(&server);
    let removed = client.webhooks.remove("wh_1").await.unwrap();

    assert_eq!(removed, json!({}));
}

#[tokio::test]
async fn test_rejected_client_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_support::oauth_client(&server);
    let err = client.webhooks.retrieve_webhooks().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(client.http().token_manager().unwrap().access_token().await.is_none());
}

#[tokio::test]
async fn test_status_codes_map_to_error_kinds() {
    let table = [
        (401, ErrorKind::Authentication),
        (403, ErrorKind::ActionNotAllowed),
        (404, ErrorKind::NotFound),
        (409, ErrorKind::UrlAlreadyRegistered),
        (422, ErrorKind::Validation),
        (429, ErrorKind::TooManyRequests),
        (502, ErrorKind::BadGateway),
        (500, ErrorKind::Api),
    ];

    for (status, kind) in table {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/pay_1"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let client = test_support::static_key_client(&server);
        let err = client.payments.get("pay_1").await.unwrap_err();

        assert_eq!(err.kind(), kind, "status {}", status);
        assert_eq!(err.http_status(), Some(status));
    }
}

#[tokio::test]
async fn test_validation_error_keeps_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "request_id": "req_42",
            "error_type": "request_invalid",
            "error_codes": ["payment_source_required", "currency_required"]
        })))
        .mount(&server)
        .await;

    let client = test_support::static_key_client(&server);
    let err = client
        .payments
        .request(&json!({"amount": 100}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.error_codes(),
        vec![
            "payment_source_required".to_string(),
            "currency_required".to_string()
        ]
    );
    assert_eq!(err.request_id(), Some("req_42"));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/payments/pay_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "pay_1"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = test_support::client_with_timeout(&server, Duration::from_millis(50));
    let err = client.payments.get("pay_1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ApiTimeout);
    assert_eq!(err.http_status(), None);
}

#[tokio::test]
async fn test_response_headers_are_exposed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/payments"))
        .and(query_param("reference", "ORD-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Cko-Request-Id", "req_7")
                .insert_header("Cko-Version", "3.1.0")
                .set_body_json(json!({"data": []})),
        )
        .mount(&server)
        .await;

    let client = test_support::static_key_client(&server);
    let response = client.http().get("/payments?reference=ORD-1").await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.json, json!({"data": []}));
    assert_eq!(response.request_id(), Some("req_7"));
    assert_eq!(response.version(), Some("3.1.0"));
}

#[tokio::test]
async fn test_unreachable_host_is_api_error() {
    let options = ConfigOptions::new().with_host("http://127.0.0.1:9");
    let config = Config::resolve(Some(test_support::SANDBOX_SECRET), &options, |_| None);
    let client = CheckoutClient::with_config(config, &options);

    let err = client.payments.get("pay_1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.http_status(), None);
}
