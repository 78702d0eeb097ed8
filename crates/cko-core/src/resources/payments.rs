//! Payments resource

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::{require_id, to_body};
use crate::http::client::{single_header, IDEMPOTENCY_KEY_HEADER};
use crate::http::{build_query_params, AuthSource, HttpClient};
use crate::Result;

#[derive(Debug, Clone)]
pub struct Payments {
    http: Arc<HttpClient>,
}

impl Payments {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Request a payment or payout
    ///
    /// The idempotency key, when given, is sent as `Cko-Idempotency-Key`.
    pub async fn request<T: Serialize + ?Sized>(
        &self,
        body: &T,
        idempotency_key: Option<&str>,
    ) -> Result<Value> {
        let body = to_body(body)?;
        let headers = match idempotency_key {
            Some(key) => single_header(IDEMPOTENCY_KEY_HEADER, key)?,
            None => HeaderMap::new(),
        };

        let response = self
            .http
            .request(Method::POST, "/payments", AuthSource::Secret, Some(body), headers)
            .await?;
        Ok(response.json)
    }

    pub async fn get(&self, id: &str) -> Result<Value> {
        let id = require_id("payment id", id)?;
        let response = self.http.get(&format!("/payments/{}", id)).await?;
        Ok(response.json)
    }

    /// List payments filtered by query parameters such as `reference`, `limit`, `skip`
    pub async fn list(&self, params: &[(&str, &str)]) -> Result<Value> {
        let path = build_query_params("/payments", params.iter().copied());
        let response = self.http.get(&path).await?;
        Ok(response.json)
    }
}
