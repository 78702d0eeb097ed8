//! Thin resource wrappers
//!
//! Each resource builds a path and body and delegates to the shared
//! [`HttpClient`](crate::http::HttpClient).

pub mod payments;
pub mod tokens;
pub mod webhooks;

pub use payments::Payments;
pub use tokens::Tokens;
pub use webhooks::Webhooks;

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Serialize a request body, rejecting anything that is not a JSON object
pub(crate) fn to_body<T: Serialize + ?Sized>(body: &T) -> Result<Value> {
    match serde_json::to_value(body)? {
        value @ Value::Object(_) => Ok(value),
        other => Err(Error::Value {
            message: "Request body must be a JSON object".to_string(),
            body: Some(other),
        }),
    }
}

/// Reject empty identifiers before they turn into a different path
pub(crate) fn require_id<'a>(name: &str, id: &'a str) -> Result<&'a str> {
    if id.trim().is_empty() {
        return Err(Error::value(format!("{} must not be empty", name)));
    }
    Ok(id)
}
