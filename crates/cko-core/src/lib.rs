//! cko-core - transport core for the Checkout.com API
//!
//! This crate provides the request layer every API resource goes through:
//! deciding how a credential authenticates, keeping an OAuth access token
//! fresh, executing requests, and mapping failures onto typed errors.
//!
//! # Main Components
//!
//! - **Credential Classification**: static keys, NAS keys and OAuth client
//!   credentials, each with its sandbox/live host
//! - **Token Management**: lazily issued, cached and refreshed access tokens
//! - **Request Execution**: authenticated JSON requests raced against a timeout
//! - **Error Mapping**: one [`Error`] variant per failure kind
//!
//! # Example
//!
//! ```no_run
//! use cko_core::{CheckoutClient, ConfigOptions, Error};
//! use serde_json::json;
//!
//! # async fn example() -> cko_core::Result<()> {
//! let client = CheckoutClient::new(
//!     Some("sk_sbox_m73dzbpy7cf3gfd46xr4yj5xo4e"),
//!     ConfigOptions::default(),
//! );
//!
//! match client.payments.request(&json!({"amount": 100, "currency": "GBP"}), None).await {
//!     Ok(payment) => println!("created {}", payment["id"]),
//!     Err(Error::Validation { .. }) => println!("rejected"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod resources;

// Re-export main types for convenience
pub use client::CheckoutClient;
pub use config::{Config, ConfigOptions, Environment};
pub use error::{Error, ErrorKind, Result};
pub use http::{
    AccessToken, ApiResponse, AuthMode, AuthSource, Credentials, HttpClient, HttpTransport,
    Scope, TransportKind,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }
}
