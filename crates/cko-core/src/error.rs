//! Error types for the Checkout.com transport core
//!
//! Every failure the client can produce ends up as exactly one variant of
//! [`Error`]. HTTP failures carry the status code and the parsed error body so
//! callers can inspect `error_codes` on validation failures.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Main error type for API operations
#[derive(Error, Debug)]
pub enum Error {
    /// The request did not complete within the configured timeout
    #[error("API request timed out: {message}")]
    ApiTimeout { message: String },

    /// 401 - credentials were rejected
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        body: Option<Value>,
    },

    /// 403 - the credential is valid but not allowed to perform the action
    #[error("Action not allowed: {message}")]
    ActionNotAllowed {
        message: String,
        body: Option<Value>,
    },

    /// 404
    #[error("Resource not found: {message}")]
    NotFound {
        message: String,
        body: Option<Value>,
    },

    /// 409 - raised when registering a webhook URL that already exists
    #[error("URL already registered: {message}")]
    UrlAlreadyRegistered {
        message: String,
        body: Option<Value>,
    },

    /// 422 - the body usually carries `error_codes`
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        body: Option<Value>,
    },

    /// 429
    #[error("Too many requests: {message}")]
    TooManyRequests {
        message: String,
        body: Option<Value>,
    },

    /// 502
    #[error("Bad gateway: {message}")]
    BadGateway {
        message: String,
        body: Option<Value>,
    },

    /// Any other non-2xx status, unparseable bodies and network failures
    #[error("API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        body: Option<Value>,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Input rejected before any network call was made
    #[error("Invalid value: {message}")]
    Value {
        message: String,
        body: Option<Value>,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Discriminant of [`Error`], handy for matching without destructuring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ApiTimeout,
    Authentication,
    ActionNotAllowed,
    NotFound,
    UrlAlreadyRegistered,
    Validation,
    TooManyRequests,
    BadGateway,
    Api,
    Value,
}

impl Error {
    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ApiTimeout { .. } => ErrorKind::ApiTimeout,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::ActionNotAllowed { .. } => ErrorKind::ActionNotAllowed,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::UrlAlreadyRegistered { .. } => ErrorKind::UrlAlreadyRegistered,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::TooManyRequests { .. } => ErrorKind::TooManyRequests,
            Error::BadGateway { .. } => ErrorKind::BadGateway,
            Error::Api { .. } => ErrorKind::Api,
            Error::Value { .. } => ErrorKind::Value,
        }
    }

    /// HTTP status that produced this error, if the request completed
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Authentication { .. } => Some(401),
            Error::ActionNotAllowed { .. } => Some(403),
            Error::NotFound { .. } => Some(404),
            Error::UrlAlreadyRegistered { .. } => Some(409),
            Error::Validation { .. } => Some(422),
            Error::TooManyRequests { .. } => Some(429),
            Error::BadGateway { .. } => Some(502),
            Error::Api { status_code, .. } => *status_code,
            Error::ApiTimeout { .. } | Error::Value { .. } => None,
        }
    }

    /// Parsed error payload returned by the server, if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            Error::ApiTimeout { .. } => None,
            Error::Authentication { body, .. }
            | Error::ActionNotAllowed { body, .. }
            | Error::NotFound { body, .. }
            | Error::UrlAlreadyRegistered { body, .. }
            | Error::Validation { body, .. }
            | Error::TooManyRequests { body, .. }
            | Error::BadGateway { body, .. }
            | Error::Api { body, .. }
            | Error::Value { body, .. } => body.as_ref(),
        }
    }

    /// `error_codes` reported in the body, empty when there are none
    pub fn error_codes(&self) -> Vec<String> {
        self.body()
            .and_then(|body| body.get("error_codes"))
            .and_then(Value::as_array)
            .map(|codes| {
                codes
                    .iter()
                    .filter_map(|c| c.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `request_id` reported in the body
    pub fn request_id(&self) -> Option<&str> {
        self.body()
            .and_then(|body| body.get("request_id"))
            .and_then(Value::as_str)
    }

    /// Build a [`Error::Value`] for input rejected before the network
    pub fn value(message: impl Into<String>) -> Self {
        Error::Value {
            message: message.into(),
            body: None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ApiTimeout => "ApiTimeout",
            ErrorKind::Authentication => "AuthenticationError",
            ErrorKind::ActionNotAllowed => "ActionNotAllowed",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::UrlAlreadyRegistered => "UrlAlreadyRegistered",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::TooManyRequests => "TooManyRequestsError",
            ErrorKind::BadGateway => "BadGateway",
            ErrorKind::Api => "ApiError",
            ErrorKind::Value => "ValueError",
        };
        write!(f, "{}", name)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Value {
            message: format!("Value could not be serialized as JSON: {}", err),
            body: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound {
            message: "payment pay_123".to_string(),
            body: None,
        };
        assert_eq!(err.to_string(), "Resource not found: payment pay_123");
    }

    #[test]
    fn test_error_codes_extraction() {
        let err = Error::Validation {
            message: "Unprocessable Entity".to_string(),
            body: Some(json!({
                "request_id": "0HL80RJLS76I7",
                "error_type": "request_invalid",
                "error_codes": ["payment_source_required", "amount_invalid"]
            })),
        };

        assert_eq!(
            err.error_codes(),
            vec!["payment_source_required".to_string(), "amount_invalid".to_string()]
        );
        assert_eq!(err.request_id(), Some("0HL80RJLS76I7"));
        assert_eq!(err.http_status(), Some(422));
    }

    #[test]
    fn test_timeout_has_no_status() {
        let err = Error::ApiTimeout {
            message: "15000ms elapsed".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::ApiTimeout);
        assert_eq!(err.http_status(), None);
        assert!(err.body().is_none());
        assert!(err.error_codes().is_empty());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Authentication.to_string(), "AuthenticationError");
        assert_eq!(ErrorKind::Value.to_string(), "ValueError");
    }
}
