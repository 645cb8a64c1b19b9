use std::future::Future;

use tokio::time::sleep;

use crate::{StoreConfig, StoreError};

/// Re-runs a store call while it fails with a transient error, doubling the
/// pause each time. Used for the one-shot reads a client makes before it has
/// a subscription to lean on, such as looking up a room code.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &StoreConfig,
    mut call: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut delay = config.retry_delay();
    let mut attempt = 0;
    loop {
        match call().await {
            Err(err) if err.is_transient() && attempt < config.retries => {
                attempt += 1;
                tracing::warn!(
                    "Store call failed ({}), retry {} of {} in {:?}",
                    err,
                    attempt,
                    config.retries,
                    delay
                );
                sleep(delay).await;
                delay *= 2;
            }
            outcome => return outcome,
        }
    }
}
