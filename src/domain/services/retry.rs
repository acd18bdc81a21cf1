use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::error::AppError;

/// Backoff for idempotent reads. Mutations are never retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

const MAX_DELAY: Duration = Duration::from_secs(5);

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 2, base_delay: Duration::from_millis(100) }
    }
}

fn backoff_delay(policy: RetryPolicy, attempt: u32) -> Duration {
    policy.base_delay.saturating_mul(2u32.saturating_pow(attempt)).min(MAX_DELAY)
}

pub async fn retry_read<T, F, Fut>(policy: RetryPolicy, operation: &str, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.attempts => {
                let delay = backoff_delay(policy, attempt);
                attempt += 1;
                warn!(operation, attempt, delay_ms = delay.as_millis() as u64, "Transient read failure, retrying: {}", e);
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
