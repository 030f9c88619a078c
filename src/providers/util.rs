use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// How often and how fast a failed request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry attempts after the first one
    pub retries: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Sends a request, retrying on transport errors and 5xx responses
///
/// # Parameters
/// - `operation`: Closure returning the request future
/// - `policy`: Number of retries and the delay between them
///
/// # Returns
/// The first response that is not a server error, the last server error
/// response, or the transport error of the last attempt
pub async fn with_retry<F, Fut>(mut operation: F, policy: RetryPolicy) -> Result<reqwest::Response, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        let outcome = operation().await;
        let retryable = match &outcome {
            Ok(response) => response.status().is_server_error(),
            Err(_) => true,
        };
        if !retryable || attempt > policy.retries {
            return outcome.map_err(Error::from);
        }

        match &outcome {
            Ok(response) => debug!(
                "Attempt {}/{} returned {}. Retrying...",
                attempt,
                policy.retries,
                response.status()
            ),
            Err(err) => debug!(
                "Attempt {}/{} failed: {}. Retrying...",
                attempt, policy.retries, err
            ),
        }
        attempt += 1;
        tokio::time::sleep(policy.delay).await;
    }
}
