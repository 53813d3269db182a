//! Utility functions and helpers
//!
//! This module provides identifier generation and retry helpers shared by
//! the store and the client.

use std::time::Duration;

use log::debug;
use uuid::Uuid;

/// Generate a UUID v4
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Retry a fallible operation with exponential backoff.
///
/// `should_retry` decides whether a given error is worth another attempt;
/// errors it rejects are returned immediately.
pub async fn retry_with_backoff<F, Fut, T, E, R>(
    operation: F,
    should_retry: R,
    max_retries: usize,
    initial_backoff: Duration,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let mut retries = 0;
    let mut backoff = initial_backoff;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if retries >= max_retries || !should_retry(&err) {
                    return Err(err);
                }

                retries += 1;
                debug!("Attempt {} failed, retrying in {:?}", retries, backoff);
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }
    }
}
