//! Webhook registration

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::{require_id, to_body};
use crate::http::HttpClient;
use crate::Result;

#[derive(Debug, Clone)]
pub struct Webhooks {
    http: Arc<HttpClient>,
}

impl Webhooks {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Register a webhook; an already registered URL fails with
    /// [`Error::UrlAlreadyRegistered`](crate::Error::UrlAlreadyRegistered)
    pub async fn register<T: Serialize + ?Sized>(&self, body: &T) -> Result<Value> {
        let response = self.http.post("/webhooks", Some(to_body(body)?)).await?;
        Ok(response.json)
    }

    pub async fn retrieve_webhooks(&self) -> Result<Value> {
        let response = self.http.get("/webhooks").await?;
        Ok(response.json)
    }

    pub async fn remove(&self, id: &str) -> Result<Value> {
        let id = require_id("webhook id", id)?;
        let response = self.http.delete(&format!("/webhooks/{}", id)).await?;
        Ok(response.json)
    }
}
