use std::{sync::Arc, time::Duration};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
#[cfg(test)]
use mockall::automock;
use tracing::{error, info, warn};

use super::schedule::JobSchedule;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScheduledJob {
    fn name(&self) -> &'static str;

    async fn execute(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): `base * 2^(retry - 1)`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff_base.saturating_mul(factor)
    }
}

/// Runs `job` once plus up to `max_retries` retries. The last error is
/// logged at error level and returned.
pub async fn run_with_retry(
    job: &(dyn ScheduledJob + Send + Sync),
    policy: RetryPolicy,
) -> Result<()> {
    let mut retry = 0;
    loop {
        match job.execute().await {
            Ok(()) => {
                info!(job = job.name(), retries = retry, "scheduler: job completed");
                return Ok(());
            }
            Err(err) if retry >= policy.max_retries => {
                error!(
                    job = job.name(),
                    retries = retry,
                    error = ?err,
                    "scheduler: job failed, giving up"
                );
                return Err(err);
            }
            Err(err) => {
                retry += 1;
                let delay = policy.delay_for(retry);
                warn!(
                    job = job.name(),
                    retry,
                    delay_secs = delay.as_secs(),
                    error = ?err,
                    "scheduler: job failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Sleeps until each fire time of `schedule` and runs `job` with retries.
/// Returns only when the schedule has no further fire times.
pub async fn run_scheduled(
    schedule: JobSchedule,
    job: Arc<dyn ScheduledJob + Send + Sync>,
    policy: RetryPolicy,
) -> Result<()> {
    info!(
        job = job.name(),
        schedule = schedule.name(),
        timezone = %schedule.timezone(),
        "scheduler: started"
    );

    loop {
        let now = Utc::now();
        let Some(next) = schedule.next_after(now) else {
            bail!("{}: schedule has no upcoming fire time", schedule.name());
        };

        info!(job = job.name(), next_run = %next, "scheduler: next run planned");
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        // Failures are already logged; the next fire time still applies.
        let _ = run_with_retry(job.as_ref(), policy).await;
    }
}
