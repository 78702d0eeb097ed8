//! Error mapping
//!
//! Turns failed exchanges into exactly one [`Error`] variant. Status codes map
//! by direct lookup; anything unrecognised becomes [`Error::Api`].

use reqwest::StatusCode;
use serde_json::Value;

use crate::http::transport::{TransportError, TransportResponse};
use crate::Error;

/// Map a status code and optional parsed body to an error
pub fn map_status(status: u16, body: Option<Value>) -> Error {
    let message = status_message(status, body.as_ref());
    match status {
        401 => Error::Authentication { message, body },
        403 => Error::ActionNotAllowed { message, body },
        404 => Error::NotFound { message, body },
        409 => Error::UrlAlreadyRegistered { message, body },
        422 => Error::Validation { message, body },
        429 => Error::TooManyRequests { message, body },
        502 => Error::BadGateway { message, body },
        _ => Error::Api {
            message,
            status_code: Some(status),
            body,
            source: None,
        },
    }
}

/// Map a non-2xx response
pub fn from_response(response: &TransportResponse) -> Error {
    map_status(response.status, parse_error_body(&response.body))
}

/// A 2xx response whose body was expected to be JSON but is not
pub fn unparseable_body(response: &TransportResponse, error: serde_json::Error) -> Error {
    let raw = String::from_utf8_lossy(&response.body).into_owned();
    Error::Api {
        message: format!(
            "{} response body is not valid JSON: {}",
            response.status, error
        ),
        status_code: Some(response.status),
        body: Some(Value::String(raw)),
        source: Some(anyhow::Error::new(error)),
    }
}

/// Map a failure that happened before a response was received
pub fn from_transport_error(error: TransportError) -> Error {
    match error {
        TransportError::Timeout(message) => Error::ApiTimeout { message },
        other => Error::Api {
            message: other.to_string(),
            status_code: None,
            body: None,
            source: Some(anyhow::Error::new(other)),
        },
    }
}

/// Parse an error body: JSON when possible, raw text otherwise
fn parse_error_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice::<Value>(body)
        .ok()
        .or_else(|| Some(Value::String(String::from_utf8_lossy(body).into_owned())))
}

fn status_message(status: u16, body: Option<&Value>) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status");

    let error_type = body
        .and_then(|b| b.get("error_type"))
        .and_then(Value::as_str);

    match error_type {
        Some(error_type) => format!("{} {} ({})", status, reason, error_type),
        None => format!("{} {}", status, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use reqwest::header::HeaderMap;
    use serde_json::json;

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse {
            status,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_status_lookup() {
        let table = [
            (401, ErrorKind::Authentication),
            (403, ErrorKind::ActionNotAllowed),
            (404, ErrorKind::NotFound),
            (409, ErrorKind::UrlAlreadyRegistered),
            (422, ErrorKind::Validation),
            (429, ErrorKind::TooManyRequests),
            (502, ErrorKind::BadGateway),
        ];

        for (status, kind) in table {
            let err = map_status(status, None);
            assert_eq!(err.kind(), kind, "status {}", status);
            assert_eq!(err.http_status(), Some(status));
        }
    }

    #[test]
    fn test_other_statuses_are_api_errors() {
        for status in [400, 405, 500, 503, 504, 418] {
            let err = map_status(status, None);
            assert_eq!(err.kind(), ErrorKind::Api);
            assert_eq!(err.http_status(), Some(status));
        }
    }

    #[test]
    fn test_validation_body_retained() {
        let body = json!({
            "request_id": "req_1",
            "error_type": "request_invalid",
            "error_codes": ["currency_required"]
        });
        let err = from_response(&response(422, &body.to_string()));

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.error_codes(), vec!["currency_required".to_string()]);
        assert_eq!(err.request_id(), Some("req_1"));
        assert!(err.to_string().contains("request_invalid"));
    }

    #[test]
    fn test_empty_and_text_bodies() {
        let empty = from_response(&response(401, ""));
        assert!(empty.body().is_none());

        let text = from_response(&response(500, "<html>oops</html>"));
        assert_eq!(text.kind(), ErrorKind::Api);
        assert_eq!(text.body(), Some(&json!("<html>oops</html>")));
    }

    #[test]
    fn test_unparseable_success_body() {
        let resp = response(200, "not json");
        let parse_error = serde_json::from_slice::<Value>(&resp.body).unwrap_err();
        let err = unparseable_body(&resp, parse_error);

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.http_status(), Some(200));
        assert_eq!(err.body(), Some(&json!("not json")));
    }

    #[test]
    fn test_transport_errors() {
        let timeout = from_transport_error(TransportError::Timeout("elapsed".to_string()));
        assert_eq!(timeout.kind(), ErrorKind::ApiTimeout);
        assert_eq!(timeout.http_status(), None);

        let connect = from_transport_error(TransportError::Connect("refused".to_string()));
        assert_eq!(connect.kind(), ErrorKind::Api);
        assert_eq!(connect.http_status(), None);
    }
}
