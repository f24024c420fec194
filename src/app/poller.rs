use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::info;

/// Settings for [`poll_until_below_limit`].
///
/// Neither cap has a default, but at least one must be set before polling:
/// an uncapped config is rejected with [`PollError::Unbounded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub limit: u64,
    pub delay: Duration,
    pub max_attempts: Option<NonZeroU32>,
    pub max_duration: Option<Duration>,
}

impl PollConfig {
    pub fn new(limit: u64, delay: Duration) -> Self {
        Self {
            limit,
            delay,
            max_attempts: None,
            max_duration: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: NonZeroU32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.max_attempts.is_some() || self.max_duration.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub passes: u32,
    pub rows_processed: u64,
}

#[derive(Debug, Error)]
pub enum PollError<E> {
    #[error("Poll limit must be positive")]
    InvalidLimit,
    #[error("Poll needs a maximum attempt count or a maximum duration")]
    Unbounded,
    #[error("Gave up after {attempts} passes ({rows_processed} rows processed)")]
    Exhausted { attempts: u32, rows_processed: u64 },
    #[error("Pass {pass} failed after {rows_processed} rows processed: {source}")]
    Operation {
        pass: u32,
        rows_processed: u64,
        source: E,
    },
}

/// Re-runs `operation` while it keeps affecting exactly `limit` rows.
///
/// Each pass waits `delay` before the next. Returns the sum of affected rows
/// across all passes once a pass comes in under the limit.
pub async fn poll_until_below_limit<F, Fut, E>(
    mut operation: F,
    config: &PollConfig,
) -> Result<PollOutcome, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<u64, E>>,
{
    if config.limit == 0 {
        return Err(PollError::InvalidLimit);
    }
    if !config.is_bounded() {
        return Err(PollError::Unbounded);
    }

    let started = Instant::now();
    let mut passes: u32 = 0;
    let mut rows_processed: u64 = 0;

    loop {
        passes += 1;
        let affected = operation().await.map_err(|source| PollError::Operation {
            pass: passes,
            rows_processed,
            source,
        })?;
        rows_processed += affected;
        info!(
            pass = passes,
            rows_processed,
            "Pass {}: Processed {} rows so far.",
            passes,
            rows_processed
        );

        if affected != config.limit {
            return Ok(PollOutcome {
                passes,
                rows_processed,
            });
        }

        let attempts_spent = config.max_attempts.is_some_and(|max| passes >= max.get());
        let time_spent = config
            .max_duration
            .is_some_and(|max| started.elapsed() >= max);
        if attempts_spent || time_spent {
            return Err(PollError::Exhausted {
                attempts: passes,
                rows_processed,
            });
        }

        sleep(config.delay).await;
    }
}
