//! Async helpers shared by the provider-facing components.

use std::future::Future;
use std::time::Duration;

use tokio::time::error::Elapsed;

/// Await `future`, giving up after `limit` when one is set.
///
/// # Example
/// ```rust,no_run
/// use std::time::Duration;
/// use drug_label_rag::utils::with_optional_timeout;
///
/// # async fn example() {
/// let value = with_optional_timeout(Some(Duration::from_secs(1)), async { 7 }).await;
/// assert_eq!(value.unwrap(), 7);
/// # }
/// ```
pub async fn with_optional_timeout<F, T>(limit: Option<Duration>, future: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, future).await,
        None => Ok(future.await),
    }
}
