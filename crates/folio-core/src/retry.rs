//! Timeout and retry around collaborator calls

use crate::config::RetryConfig;
use crate::error::PipelineError;
use std::future::Future;
use std::time::Duration;

/// Run `op` under `timeout`, retrying retryable failures with backoff
///
/// `op` receives the 1-based attempt number. Each elapsed deadline becomes
/// [`PipelineError::Timeout`], which is itself retryable.
///
/// # Errors
/// Returns the last error once attempts are exhausted, or the first
/// non-retryable error immediately.
pub async fn with_retry<T, F, Fut>(
    retry: &RetryConfig,
    timeout: Duration,
    operation: &'static str,
    mut op: F,
) -> Result<T, PipelineError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let result = match tokio::time::timeout(timeout, op(attempt)).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout {
                operation,
                duration_secs: timeout.as_secs(),
            }),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let delay = retry.backoff(attempt);
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "collaborator call failed, retrying"
                );
                metrics::counter!("folio_pass_retries_total", "operation" => operation).increment(1);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
