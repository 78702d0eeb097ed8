//! Transport core shared by every resource
//!
//! This module provides:
//! - Credential classification and host selection
//! - OAuth access token issuance and caching
//! - Request execution over a pluggable HTTP backend
//! - Mapping of failures onto the typed error taxonomy

pub mod auth;
pub mod client;
pub mod error;
pub mod timeout;
pub mod token;
pub mod transport;

pub use auth::{classify, AuthMode, Classification, Credentials, Scope};
pub use client::{build_query_params, ApiResponse, AuthSource, HttpClient};
pub use token::{AccessToken, TokenManager};
pub use transport::{
    HttpTransport, ReqwestTransport, RequestBody, TransportError, TransportKind,
    TransportRequest, TransportResponse,
};

// Re-export commonly used types
pub use reqwest::{Method, StatusCode};
