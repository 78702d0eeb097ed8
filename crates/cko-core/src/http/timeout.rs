//! Request timeout race
//!
//! Every network call is raced against the configured timeout. Losing the race
//! drops the in-flight future, which aborts the underlying request.

use std::future::Future;
use std::time::Duration;

use crate::{Error, Result};

/// Run `future` with a deadline, mapping expiry to [`Error::ApiTimeout`]
pub async fn with_timeout<F, T>(future: F, timeout: Duration) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::ApiTimeout {
            message: format!("request did not complete within {}ms", timeout.as_millis()),
        }),
    }
}
