//! Card and wallet tokenization, authorized with the public key

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::to_body;
use crate::http::{AuthSource, HttpClient};
use crate::{Error, Result};

const TOKEN_TYPES: [&str; 3] = ["card", "applepay", "googlepay"];

#[derive(Debug, Clone)]
pub struct Tokens {
    http: Arc<HttpClient>,
}

impl Tokens {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Exchange card or wallet data for a token
    pub async fn request<T: Serialize + ?Sized>(&self, body: &T) -> Result<Value> {
        let body = to_body(body)?;
        let token_type = body.get("type").and_then(Value::as_str);
        if !token_type.is_some_and(|t| TOKEN_TYPES.contains(&t)) {
            return Err(Error::Value {
                message: format!("Token type must be one of {}", TOKEN_TYPES.join(", ")),
                body: body.get("type").cloned(),
            });
        }

        let response = self
            .http
            .request(Method::POST, "/tokens", AuthSource::PublicKey, Some(body), HeaderMap::new())
            .await?;
        Ok(response.json)
    }
}
